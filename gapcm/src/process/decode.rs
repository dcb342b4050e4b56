//! Game PCM to consumer PCM.
//!
//! Payload sectors are read one per channel per round and interleaved into
//! frames. The loop region is replayed by seeking back to the mark sector.

use std::io::{self, Read, Seek, SeekFrom, Write};

use log::{debug, trace};

use super::sector::SectorCodec;
use super::{BLOCK_SAMPLES, PcmConfig, SECTOR_BYTES, SEEK_STEP_SECTORS};
use crate::structs::channel::ChannelBlocks;
use crate::structs::header::Header;
use crate::utils::errors::StreamError;
use crate::utils::io::{read_full, write_counted};

/// Decodes game PCM streams to interleaved consumer PCM.
///
/// Every method starts at the current position of `source`, which for the
/// payload operations must be the start of a sector, and returns the count
/// of consumer bytes written to `output`. Running out of source data ends the
/// call early with a short count; it is not an error. Compare the count with
/// the expected total, e.g. [`Header::loop_samples`], to detect truncation.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use gapcm::process::decode::Decoder;
/// use gapcm::structs::header::Header;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let header = Header { format: 2, mark: 0, length: 2048, ..Default::default() };
/// let mut stream = header.encode();
/// stream.resize(3 * 2048, 0x80); // two sectors of silence
///
/// let mut source = Cursor::new(stream);
/// let header = Header::read_from(&mut source)?;
/// header.validate()?;
///
/// let mut output = Vec::new();
/// let written = Decoder::default().decode_stream(&header, &mut source, &mut output, 2)?;
/// assert_eq!(written, 2 * 2048);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decoder {
    codec: SectorCodec,
}

impl Decoder {
    pub fn new(config: PcmConfig) -> Self {
        Self {
            codec: SectorCodec::new(config),
        }
    }

    /// Decodes the region before the loop start once, then the loop region
    /// `loop_count` times.
    ///
    /// The loop region is only entered when the pre-loop region decoded in
    /// full.
    pub fn decode_stream<R, W>(
        &self,
        header: &Header,
        source: &mut R,
        output: &mut W,
        loop_count: u32,
    ) -> Result<u64, StreamError>
    where
        R: Read + Seek + ?Sized,
        W: Write + ?Sized,
    {
        let mut run = DecodeRun::new(self.codec, header, source, output)?;
        let mark = header.mark_samples();
        debug!(
            "Decoding stream: {} channel(s), mark {} samples, {} loop(s)",
            run.blocks.channel_count(),
            mark,
            loop_count
        );

        let out = run.decode_for(mark)?;
        if out != mark {
            debug!("Pre-loop region ended after {out} of {mark} samples");
            return Ok(out);
        }

        run.decode_loop(loop_count)
            .map(|n| out + n)
            .map_err(|e| e.after(out))
    }

    /// Decodes at most `frames` frames from the current position.
    pub fn decode_stream_for<R, W>(
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
        let mut run = DecodeRun::new(self.codec, header, source, output)?;
        let count = frames as u64 * run.blocks.channel_count() as u64;
        debug!("Decoding {frames} frame(s) ({count} samples)");
        run.decode_for(count)
    }

    /// Decodes the loop region `loop_count` times, seeking back to the mark
    /// between passes. `source` must already be positioned at the mark.
    ///
    /// Stops after a pass that comes up short of the loop length.
    pub fn decode_loop<R, W>(
        &self,
        header: &Header,
        source: &mut R,
        output: &mut W,
        loop_count: u32,
    ) -> Result<u64, StreamError>
    where
        R: Read + Seek + ?Sized,
        W: Write + ?Sized,
    {
        DecodeRun::new(self.codec, header, source, output)?.decode_loop(loop_count)
    }

    /// Writes `count` silent consumer samples.
    pub fn decode_silence<W: Write + ?Sized>(
        &self,
        count: u64,
        output: &mut W,
    ) -> Result<u64, StreamError> {
        let silence = [self.codec.origin(); BLOCK_SAMPLES];
        let mut out = 0;
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(BLOCK_SAMPLES as u64) as usize;
            write_counted(output, &silence[..n], &mut out)
                .map_err(|source| StreamError::Write { written: out, source })?;
            remaining -= n as u64;
        }
        Ok(out)
    }

    /// Writes `pregap` blocks of silence.
    pub fn decode_pregap<W: Write + ?Sized>(
        &self,
        pregap: u8,
        output: &mut W,
    ) -> Result<u64, StreamError> {
        self.decode_silence(BLOCK_SAMPLES as u64 * pregap as u64, output)
    }
}

/// Seeks `stream` to the payload sector at `mark` blocks and returns the new
/// position.
///
/// The distance is covered in relative steps of at most
/// [`SEEK_STEP_SECTORS`] sectors, so no single offset exceeds 32 bits. Any
/// read-ahead held by a buffered stream is discarded by the seek.
pub fn decode_seek<S: Seek + ?Sized>(stream: &mut S, mark: u32) -> io::Result<u64> {
    let mut position = stream.seek(SeekFrom::Start(SECTOR_BYTES as u64))?;
    let mut remaining = mark;
    while remaining >= SEEK_STEP_SECTORS {
        position = stream.seek(SeekFrom::Current(
            SEEK_STEP_SECTORS as i64 * SECTOR_BYTES as i64,
        ))?;
        remaining -= SEEK_STEP_SECTORS;
    }
    if remaining > 0 {
        position = stream.seek(SeekFrom::Current(remaining as i64 * SECTOR_BYTES as i64))?;
    }
    Ok(position)
}

/// Scratch state for one decode call.
struct DecodeRun<'a, R: ?Sized, W: ?Sized> {
    codec: SectorCodec,
    header: &'a Header,
    source: &'a mut R,
    output: &'a mut W,
    blocks: ChannelBlocks,
    sector: Vec<u8>,
    frames: Vec<u8>,
}

impl<'a, R, W> DecodeRun<'a, R, W>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    fn new(
        codec: SectorCodec,
        header: &'a Header,
        source: &'a mut R,
        output: &'a mut W,
    ) -> Result<Self, StreamError> {
        let layout = header.require_layout()?;
        let blocks = ChannelBlocks::new(layout);
        Ok(Self {
            codec,
            header,
            source,
            output,
            frames: Vec::with_capacity(BLOCK_SAMPLES * blocks.channel_count()),
            blocks,
            sector: vec![0; SECTOR_BYTES],
        })
    }

    /// Decodes up to `count` consumer samples.
    fn decode_for(&mut self, mut count: u64) -> Result<u64, StreamError> {
        let channels = self.blocks.channel_count() as u64;
        let mut out = 0;

        while count >= channels {
            let quota = (count / channels).min(BLOCK_SAMPLES as u64) as usize;
            let mut short = false;
            let mut read_error = None;

            self.blocks.clear();
            for channel in 0..self.blocks.channel_count() {
                let n = match read_full(&mut *self.source, &mut self.sector) {
                    Ok(n) => n,
                    Err(e) => {
                        read_error = Some(e);
                        break;
                    }
                };
                let block = &mut self.blocks[channel];
                let samples = self
                    .codec
                    .decode_sector(&self.sector[..n], &mut block.samples);
                block.count = samples.min(quota);
                if n != SECTOR_BYTES {
                    short = true;
                    break;
                }
            }

            self.frames.clear();
            self.blocks.interleave(self.codec.origin(), &mut self.frames);
            write_counted(&mut *self.output, &self.frames, &mut out)
                .map_err(|source| StreamError::Write { written: out, source })?;

            if let Some(source) = read_error {
                return Err(StreamError::Read {
                    written: out,
                    source,
                });
            }

            count -= self.blocks[0].count as u64 * channels;
            trace!("Decoded {} frame(s), {count} samples left", self.blocks[0].count);

            if short {
                debug!("Source ended with {count} samples left");
                break;
            }
        }

        Ok(out)
    }
}

impl<R, W> DecodeRun<'_, R, W>
where
    R: Read + Seek + ?Sized,
    W: Write + ?Sized,
{
    fn decode_loop(&mut self, mut loop_count: u32) -> Result<u64, StreamError> {
        let length_loop = self.header.loop_samples();
        let mut out = 0;

        while loop_count > 0 {
            let n = self.decode_for(length_loop).map_err(|e| e.after(out))?;
            out += n;
            loop_count -= 1;

            if n != length_loop {
                debug!("Loop pass ended after {n} of {length_loop} samples");
                break;
            }
            if loop_count == 0 {
                break;
            }

            decode_seek(&mut *self.source, self.header.mark)
                .map_err(|source| StreamError::Seek { written: out, source })?;
            trace!("Seeked back to mark {}, {loop_count} pass(es) left", self.header.mark);
        }

        Ok(out)
    }
}
