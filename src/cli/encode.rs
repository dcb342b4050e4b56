use std::io::Write;

use anyhow::{Context, Result, anyhow, bail};
use indicatif::MultiProgress;

use super::command::{Cli, EncodeArgs};
use super::progress::{ProgressWriter, create_progress_bar};
use crate::input::{InputReader, is_pipe_path};
use crate::output::OutputWriter;
use gapcm::process::encode::Encoder;
use gapcm::process::{PcmConfig, SECTOR_BYTES};
use gapcm::structs::channel::ChannelLayout;
use gapcm::structs::header::Header;

pub fn cmd_encode(args: &EncodeArgs, _cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Encoding PCM: {}", args.input.display());

    let mut header = build_header(args)?;
    header.validate().context("Invalid header fields")?;

    if args.length.is_none() && is_pipe_path(&args.output) {
        bail!("Automatic length is unavailable with standard output; pass --length");
    }

    let mut source = InputReader::new(&args.input)?;
    let output = OutputWriter::create(&args.output)?;
    let expected = expected_bytes(&header, args, source.total_bytes());
    let pb = multi
        .map(|multi| create_progress_bar(multi, expected))
        .transpose()?;
    let mut output = ProgressWriter::new(output, pb);
    output.set_message("encoding");

    let encoder = Encoder::new(PcmConfig::with_signed(args.signed));
    let result = match args.length {
        Some(_) => encoder
            .encode_stream(&header, &mut source, &mut output, args.trail)
            .map_err(anyhow::Error::from)
            .and_then(|written| check_payload(&header, written, args.trail).map(|_| written)),
        None => encoder
            .encode_stream_patched(&mut header, &mut source, &mut output)
            .map_err(anyhow::Error::from),
    };
    output.flush()?;
    output.finish();

    let written = result?;
    if args.length.is_none() {
        log::info!("Measured length: {} frames", header.length);
    }
    log::info!("Wrote {written} bytes to {}", args.output.display());
    Ok(())
}

fn build_header(args: &EncodeArgs) -> Result<Header> {
    let layout = ChannelLayout::from_channel_count(args.channels)
        .ok_or_else(|| anyhow!("Unsupported channel count: {}", args.channels))?;

    Ok(Header {
        format: layout.format(),
        mark: args.mark,
        length: args.length.unwrap_or(u32::MAX),
        echo_pans: fixed(args.echo_pans.as_deref())?,
        echo_pregap: args.echo_pregap,
        echo_delay: args.echo_delay,
        echo_levels: fixed(args.echo_levels.as_deref())?,
        pregap: args.pregap,
    })
}

fn fixed<const N: usize>(values: Option<&[u8]>) -> Result<[u8; N]> {
    match values {
        None => Ok([0; N]),
        Some(values) => values
            .try_into()
            .map_err(|_| anyhow!("Expected {N} values, got {}", values.len())),
    }
}

/// Output size for the progress bar. Without a fixed length it is estimated
/// from the input size.
fn expected_bytes(header: &Header, args: &EncodeArgs, input_bytes: Option<u64>) -> Option<u64> {
    let header_bytes = SECTOR_BYTES as u64;
    match (args.length, args.trail) {
        (Some(_), false) => Some(header_bytes + header.payload_bytes()),
        _ => input_bytes.map(|n| header_bytes + 2 * n),
    }
}

/// An explicit length must be met in full; with the trail it is a minimum.
fn check_payload(header: &Header, written: u64, trail: bool) -> Result<()> {
    let payload = written.saturating_sub(SECTOR_BYTES as u64);
    let expected = header.payload_bytes();
    let complete = if trail {
        payload >= expected
    } else {
        payload == expected
    };
    if !complete {
        bail!("The output is incomplete: wrote {payload} of {expected} payload bytes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser as ClapParser;
    use gapcm::structs::channel::FORMAT_STEREO;
    use std::ffi::OsStr;

    use crate::cli::command::Commands;

    fn encode_args(extra: &[&str]) -> EncodeArgs {
        let argv = ["gapcmd", "encode", "in.pcm", "-o", "out.gam"]
            .into_iter()
            .chain(extra.iter().copied());
        match Cli::parse_from(argv).command {
            Commands::Encode(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn header_from_fields() -> Result<()> {
        let args = encode_args(&[
            "-c", "2", "-m", "1", "-n", "4096", "-p", "3", "--echo-delay", "9",
            "--echo-levels", "1", "2", "3",
        ]);
        let header = build_header(&args)?;

        assert_eq!(header.format, FORMAT_STEREO);
        assert_eq!(header.mark, 1);
        assert_eq!(header.length, 4096);
        assert_eq!(header.pregap, 3);
        assert_eq!(header.echo_delay, 9);
        assert_eq!(header.echo_levels, [1, 2, 3]);
        assert_eq!(header.echo_pans, [0; 6]);
        header.validate()?;
        Ok(())
    }

    #[test]
    fn automatic_length_starts_at_maximum() -> Result<()> {
        let args = encode_args(&[]);
        let header = build_header(&args)?;

        assert_eq!(header.length, u32::MAX);
        assert_eq!(expected_bytes(&header, &args, Some(100)), Some(2048 + 200));
        assert_eq!(expected_bytes(&header, &args, None), None);
        Ok(())
    }

    #[test]
    fn missing_input_leaves_output_untouched() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("gapcmd-encode-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let input = dir.join("missing.pcm");
        let output = dir.join("existing.gam");
        std::fs::write(&output, b"precious")?;

        let cli = Cli::parse_from([
            OsStr::new("gapcmd"),
            OsStr::new("encode"),
            input.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ]);
        let Commands::Encode(ref args) = cli.command else {
            unreachable!()
        };
        let err = cmd_encode(args, &cli, None).unwrap_err();

        assert!(format!("{err:#}").contains("missing.pcm"));
        assert_eq!(std::fs::read(&output)?, b"precious");
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn stdout_needs_explicit_length() {
        let cli = Cli::parse_from(["gapcmd", "encode", "in.pcm", "-o", "-"]);
        let Commands::Encode(ref args) = cli.command else {
            unreachable!()
        };
        let err = cmd_encode(args, &cli, None).unwrap_err();

        assert!(err.to_string().contains("--length"));
    }

    #[test]
    fn payload_check() -> Result<()> {
        let header = Header {
            format: FORMAT_STEREO,
            length: 1500,
            ..Default::default()
        };
        // two sectors per channel
        let full = 2048 + 4 * 2048;

        check_payload(&header, full, false)?;
        assert!(check_payload(&header, full - 2048, false).is_err());
        assert!(check_payload(&header, full + 2048, false).is_err());
        check_payload(&header, full + 2048, true)?;
        assert!(check_payload(&header, full - 2048, true).is_err());
        Ok(())
    }
}
