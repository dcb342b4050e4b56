//! Consumer PCM to game PCM.
//!
//! Interleaved frames are split per channel and written one sector per
//! channel per round, padded with silence.

use std::io::{Read, Seek, SeekFrom, Write};

use log::{debug, trace, warn};

use super::sector::SectorCodec;
use super::{BLOCK_SAMPLES, PcmConfig, SECTOR_BYTES};
use crate::structs::channel::ChannelBlocks;
use crate::structs::header::Header;
use crate::utils::errors::StreamError;
use crate::utils::io::{read_full, write_counted};

/// Totals of a payload encode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    /// Game bytes written, including sector padding.
    pub written: u64,
    /// Consumer samples consumed from the source.
    pub samples: u64,
}

/// Encodes interleaved consumer PCM into game PCM sectors.
///
/// Each round consumes up to one block per channel and writes one sector per
/// channel that received samples, in channel order, padding short blocks with
/// silence. End of source ends the encode; it is not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Encoder {
    codec: SectorCodec,
}

impl Encoder {
    pub fn new(config: PcmConfig) -> Self {
        Self {
            codec: SectorCodec::new(config),
        }
    }

    /// Encodes at most `frames` frames and returns the payload bytes written.
    /// No header is written.
    pub fn encode_stream_for<R, W>(
        &self,
        header: &Header,
        source: &mut R,
        output: &mut W,
        frames: u32,
    ) -> Result<u64, StreamError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        self.encode_payload(header, source, output, frames)
            .map(|summary| summary.written)
    }

    /// Like [`Encoder::encode_stream_for`], also reporting the consumed
    /// sample count.
    pub fn encode_payload<R, W>(
        &self,
        header: &Header,
        source: &mut R,
        output: &mut W,
        frames: u32,
    ) -> Result<EncodeSummary, StreamError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let mut run = EncodeRun::new(self.codec, header, source, output)?;
        let count = frames as u64 * run.blocks.channel_count() as u64;
        debug!("Encoding {frames} frame(s) ({count} samples)");
        run.encode_for(count)
    }

    /// Writes the header sector followed by `header.length` frames of
    /// payload, or the whole source when `trail` is set.
    ///
    /// Returns the total bytes written, header sector included.
    pub fn encode_stream<R, W>(
        &self,
        header: &Header,
        source: &mut R,
        output: &mut W,
        trail: bool,
    ) -> Result<u64, StreamError>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        header.require_layout()?;

        let mut out = 0;
        write_counted(output, &header.encode(), &mut out)
            .map_err(|source| StreamError::Write { written: out, source })?;

        let frames = if trail { u32::MAX } else { header.length };
        self.encode_stream_for(header, source, output, frames)
            .map(|n| out + n)
            .map_err(|e| e.after(out))
    }

    /// Encodes the whole source, then rewrites the header sector with the
    /// length actually consumed.
    ///
    /// On success `header.length` is set to the frame count read from the
    /// source; on failure `header` is left as it was. The output is left
    /// positioned at its end.
    pub fn encode_stream_patched<R, W>(
        &self,
        header: &mut Header,
        source: &mut R,
        output: &mut W,
    ) -> Result<u64, StreamError>
    where
        R: Read + ?Sized,
        W: Write + Seek + ?Sized,
    {
        let channels = header.require_layout()?.channel_count() as u64;

        let mut stored = header.clone();
        stored.length = u32::MAX;
        let mut out = 0;
        write_counted(output, &stored.encode(), &mut out)
            .map_err(|source| StreamError::Write { written: out, source })?;

        let summary = self
            .encode_payload(&stored, source, output, u32::MAX)
            .map_err(|e| e.after(out))?;
        out += summary.written;

        stored.length = (summary.samples / channels) as u32;
        debug!("Patching header length to {} frame(s)", stored.length);
        if let Err(e) = stored.validate() {
            warn!("The patched header is invalid: {e}");
        }

        output
            .flush()
            .map_err(|source| StreamError::Write { written: out, source })?;
        let end = output
            .stream_position()
            .map_err(|source| StreamError::Seek { written: out, source })?;
        output
            .seek(SeekFrom::Start(0))
            .map_err(|source| StreamError::Seek { written: out, source })?;

        let mut patched = 0;
        write_counted(output, &stored.encode(), &mut patched)
            .map_err(|source| StreamError::Write { written: out, source })?;
        output
            .seek(SeekFrom::Start(end))
            .map_err(|source| StreamError::Seek { written: out, source })?;

        *header = stored;
        Ok(out)
    }
}

struct EncodeRun<'a, R: ?Sized, W: ?Sized> {
    codec: SectorCodec,
    source: &'a mut R,
    output: &'a mut W,
    blocks: ChannelBlocks,
    sector: Vec<u8>,
    frames: Vec<u8>,
}

impl<'a, R, W> EncodeRun<'a, R, W>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    fn new(
        codec: SectorCodec,
        header: &Header,
        source: &'a mut R,
        output: &'a mut W,
    ) -> Result<Self, StreamError> {
        let layout = header.require_layout()?;
        Ok(Self {
            codec,
            source,
            output,
            blocks: ChannelBlocks::new(layout),
            sector: vec![0; SECTOR_BYTES],
            frames: vec![0; BLOCK_SAMPLES * layout.channel_count()],
        })
    }

    /// Encodes up to `count` consumer samples.
    fn encode_for(&mut self, mut count: u64) -> Result<EncodeSummary, StreamError> {
        let channels = self.blocks.channel_count();
        let origin = self.codec.origin();
        let mut summary = EncodeSummary::default();

        while count >= channels as u64 {
            let block_frames = (count / channels as u64).min(BLOCK_SAMPLES as u64) as usize;
            let wanted = block_frames * channels;
            let got = read_full(&mut *self.source, &mut self.frames[..wanted]).map_err(
                |source| StreamError::Read {
                    written: summary.written,
                    source,
                },
            )?;
            summary.samples += got as u64;
            self.blocks.deinterleave(&self.frames[..got]);

            for block in self.blocks.iter_mut() {
                if block.count == 0 {
                    break;
                }
                count -= block.count as u64;
                block.pad(origin);
                let n = self.codec.encode_sector(&block.samples, &mut self.sector);
                write_counted(&mut *self.output, &self.sector[..n], &mut summary.written)
                    .map_err(|source| StreamError::Write {
                        written: summary.written,
                        source,
                    })?;
            }
            trace!("Encoded {got} sample(s), {count} left");

            if got < wanted {
                debug!("Source ended with {count} samples left");
                break;
            }
        }

        Ok(summary)
    }
}
