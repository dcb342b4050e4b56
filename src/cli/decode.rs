use std::io::{Read, Seek, Write};

use anyhow::{Context, Result, bail};
use indicatif::MultiProgress;

use super::command::{Cli, DecodeArgs};
use super::progress::{ProgressWriter, create_progress_bar};
use crate::input::InputReader;
use crate::output::OutputWriter;
use gapcm::process::PcmConfig;
use gapcm::process::decode::{Decoder, decode_seek};
use gapcm::structs::channel::ChannelLayout;
use gapcm::structs::header::Header;

pub fn cmd_decode(args: &DecodeArgs, _cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Decoding GA PCM stream: {}", args.input.display());

    let mut source = InputReader::seekable(&args.input)?;
    let mut header = Header::read_from(&mut source)
        .with_context(|| format!("{}", args.input.display()))?;
    apply_overrides(&mut header, args);

    if args.info {
        println!("{header}\n");
    }
    header
        .validate()
        .with_context(|| format!("{}", args.input.display()))?;
    if args.channels.is_none() && header.channel_count() == 2 {
        log::info!("Output is stereo");
    }

    let plan = DecodePlan {
        loop_count: args.loop_count,
        trail: args.trail,
    };
    let pb = multi
        .map(|multi| create_progress_bar(multi, plan.expected_bytes(&header)))
        .transpose()?;
    let mut output = ProgressWriter::new(OutputWriter::create(&args.output)?, pb);
    output.set_message("decoding");

    let decoder = Decoder::new(PcmConfig::with_signed(args.signed));
    let result = plan.run(&decoder, &header, &mut source, &mut output);
    output.flush()?;
    output.finish();

    let written = result?;
    log::info!("Wrote {written} bytes to {}", args.output.display());
    Ok(())
}

fn apply_overrides(header: &mut Header, args: &DecodeArgs) {
    if let Some(layout) = args.channels.and_then(ChannelLayout::from_channel_count) {
        header.format = layout.format();
    }
    if let Some(mark) = args.mark {
        header.mark = mark;
    }
    if let Some(length) = args.length {
        header.length = length;
    }
    if let Some(pregap) = args.pregap {
        header.pregap = pregap;
    }
}

/// Output arrangement: pregap silence, the stream up to the loop end, then
/// the loop region repeated, optionally followed by the trail.
#[derive(Debug, Clone, Copy)]
struct DecodePlan {
    loop_count: u16,
    trail: bool,
}

impl DecodePlan {
    /// Output size when it is known up front.
    fn expected_bytes(&self, header: &Header) -> Option<u64> {
        if self.trail {
            return None;
        }
        Some(
            header.pregap_samples()
                + header.mark_samples()
                + header.loop_samples() * self.loop_count as u64,
        )
    }

    fn run<R, W>(
        &self,
        decoder: &Decoder,
        header: &Header,
        source: &mut R,
        output: &mut W,
    ) -> Result<u64>
    where
        R: Read + Seek,
        W: Write,
    {
        let pregap = header.pregap_samples();
        let mut written = decoder.decode_pregap(header.pregap, output)?;
        check_count(written, pregap)?;

        let mark = header.mark_samples();
        let length = header.length_samples();
        let length_loop = header.loop_samples();
        let loops = self.loop_count as u64;

        if self.loop_count > 1 {
            let count =
                decoder.decode_stream(header, source, output, self.loop_count as u32 - 1)?;
            written += count;
            let expected = length + length_loop * (loops - 2);
            if count != expected {
                if count == length {
                    log::warn!("Seek may have failed");
                }
                check_count(count, expected)?;
            }
            decode_seek(source, header.mark).context("Seek failed")?;
        }

        if self.trail {
            let count = decoder.decode_stream_for(header, source, output, u32::MAX)?;
            log::debug!("Trail: {count} bytes");
            written += count;
        } else if self.loop_count > 1 {
            let count = decoder.decode_loop(header, source, output, 1)?;
            written += count;
            check_count(count, length_loop)?;
        } else {
            let count = decoder.decode_stream(header, source, output, self.loop_count as u32)?;
            written += count;
            check_count(count, mark + length_loop * loops)?;
        }

        Ok(written)
    }
}

fn check_count(count: u64, expected: u64) -> Result<()> {
    if count != expected {
        bail!("The output is incomplete: wrote {count} of {expected} bytes");
    }
    Ok(())
}
