//! Stream header.
//!
//! The header fills the first sector of a game PCM stream. Multi-byte fields
//! are big-endian; everything after the fixed fields is zero padding.
//!
//! ```text
//! offset  0  u16  format
//! offset  2  u32  mark
//! offset  6  u32  length
//! offset 10  6B   echo_pans
//! offset 16  u8   echo_pregap
//! offset 17  u8   echo_delay
//! offset 18  3B   echo_levels
//! offset 21  u8   pregap
//! offset 22  ..   zero padding up to 2048
//! ```
//!
//! A block spans 1024 samples, a frame spans one sample per channel, and an
//! echo tick spans 7.8 ms.

use std::fmt;
use std::io::Read;

use gapcm_macros::ToBytes;

use crate::byteorder::WriteBytesBe;
use crate::process::{BLOCK_SAMPLES, SECTOR_BYTES};
use crate::structs::channel::ChannelLayout;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::HeaderError;
use crate::utils::io::read_full;

/// Byte count of the fixed fields at the start of the header sector.
pub const HEADER_FIELD_BYTES: usize = 22;

#[derive(Debug, Clone, Default, PartialEq, Eq, ToBytes)]
pub struct Header {
    /// Stream format. 1: stereo, 2: mono.
    pub format: u16,
    /// Loop start position in blocks.
    pub mark: u32,
    /// Length between stream start and loop end in frames.
    pub length: u32,
    /// Echo pans for channels 3 to 8. Low nibble: left, high nibble: right.
    pub echo_pans: [u8; 6],
    /// First echo delay in ticks.
    pub echo_pregap: u8,
    /// Echo delay in ticks.
    pub echo_delay: u8,
    /// Echo levels for channel pairs 3 and 4 to 7 and 8.
    pub echo_levels: [u8; 3],
    /// Artificial silence length in blocks.
    pub pregap: u8,
}

impl Header {
    /// Parses a header from the start of `sector` and returns it with the
    /// byte count consumed, which is always one sector.
    pub fn decode(sector: &[u8]) -> Result<(Self, usize), HeaderError> {
        if sector.len() < SECTOR_BYTES {
            return Err(HeaderError::Truncated(sector.len()));
        }

        let mut reader = BsIoSliceReader::from_slice(&sector[..HEADER_FIELD_BYTES]);
        let mut header = Self {
            format: reader.get_n(16)?,
            mark: reader.get_n(32)?,
            length: reader.get_n(32)?,
            ..Default::default()
        };
        reader.get_bytes(&mut header.echo_pans)?;
        header.echo_pregap = reader.get_n(8)?;
        header.echo_delay = reader.get_n(8)?;
        reader.get_bytes(&mut header.echo_levels)?;
        header.pregap = reader.get_n(8)?;

        Ok((header, SECTOR_BYTES))
    }

    /// Reads one full sector from `reader` and parses it. A short read is a
    /// framing error.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self, HeaderError> {
        let mut sector = vec![0u8; SECTOR_BYTES];
        let n = read_full(reader, &mut sector)?;
        if n != SECTOR_BYTES {
            return Err(HeaderError::Truncated(n));
        }
        Self::decode(&sector).map(|(header, _)| header)
    }

    /// Serializes the header into a fresh, zero-padded sector.
    pub fn encode(&self) -> Vec<u8> {
        let mut sector = Vec::with_capacity(SECTOR_BYTES);
        self.write_be(&mut sector);
        sector.resize(SECTOR_BYTES, 0);
        sector
    }

    pub fn layout(&self) -> Option<ChannelLayout> {
        ChannelLayout::from_format(self.format)
    }

    /// Channel count for the format, 0 when the format is invalid.
    pub fn channel_count(&self) -> usize {
        self.layout().map_or(0, ChannelLayout::channel_count)
    }

    /// Resolves the channel layout, failing on an invalid format code.
    pub fn require_layout(&self) -> Result<ChannelLayout, HeaderError> {
        self.layout().ok_or(HeaderError::InvalidFormat(self.format))
    }

    /// Checks the header invariants. The first violation found is returned.
    pub fn validate(&self) -> Result<(), HeaderError> {
        let layout = self.require_layout()?;
        if self.length == 0 {
            return Err(HeaderError::ZeroLength);
        }

        let block_frames = layout.block_frames();
        let max = u32::MAX / block_frames;
        if self.mark > max {
            return Err(HeaderError::MarkTooLarge {
                mark: self.mark,
                max,
            });
        }

        let end = self.length / block_frames;
        if end <= self.mark {
            return Err(HeaderError::LoopEndNotAfterMark {
                end,
                mark: self.mark,
            });
        }

        Ok(())
    }

    /// Consumer samples before the loop start.
    pub fn mark_samples(&self) -> u64 {
        BLOCK_SAMPLES as u64 * self.mark as u64
    }

    /// Consumer samples between stream start and loop end.
    pub fn length_samples(&self) -> u64 {
        self.length as u64 * self.channel_count() as u64
    }

    /// Consumer samples in one pass of the loop region.
    pub fn loop_samples(&self) -> u64 {
        self.length_samples().saturating_sub(self.mark_samples())
    }

    /// Consumer samples of pregap silence.
    pub fn pregap_samples(&self) -> u64 {
        BLOCK_SAMPLES as u64 * self.pregap as u64
    }

    /// Payload bytes an encoder writes for `length` frames: every channel
    /// gets whole sectors.
    pub fn payload_bytes(&self) -> u64 {
        let sectors_per_channel = (self.length as u64).div_ceil(BLOCK_SAMPLES as u64);
        sectors_per_channel * self.channel_count() as u64 * SECTOR_BYTES as u64
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.echo_pans;
        let l = &self.echo_levels;
        writeln!(f, "channel_count : {}", self.channel_count())?;
        writeln!(f, "mark          : {}", self.mark)?;
        writeln!(f, "length        : {}", self.length)?;
        writeln!(
            f,
            "echo_pans     : {:02x} {:02x} {:02x} {:02x} {:02x} {:02x}",
            p[0], p[1], p[2], p[3], p[4], p[5]
        )?;
        writeln!(f, "echo_pregap   : {}", self.echo_pregap)?;
        writeln!(f, "echo_delay    : {}", self.echo_delay)?;
        writeln!(f, "echo_levels   : {} {} {}", l[0], l[1], l[2])?;
        write!(f, "pregap        : {}", self.pregap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::channel::{FORMAT_MONO, FORMAT_STEREO};
    use std::io::Cursor;

    fn sample_header() -> Header {
        Header {
            format: FORMAT_STEREO,
            mark: 0x0102_0304,
            length: 0xA0B0_C0D0,
            echo_pans: [0x11, 0x22, 0x33, 0x44, 0x55, 0x66],
            echo_pregap: 7,
            echo_delay: 8,
            echo_levels: [9, 10, 11],
            pregap: 12,
        }
    }

    #[test]
    fn encode_matches_wire_layout() {
        let sector = sample_header().encode();

        assert_eq!(sector.len(), SECTOR_BYTES);
        assert_eq!(
            &sector[..HEADER_FIELD_BYTES],
            &[
                0x00, 0x01, // format
                0x01, 0x02, 0x03, 0x04, // mark
                0xA0, 0xB0, 0xC0, 0xD0, // length
                0x11, 0x22, 0x33, 0x44, 0x55, 0x66, // echo_pans
                7, 8, // echo_pregap, echo_delay
                9, 10, 11, // echo_levels
                12, // pregap
            ]
        );
        assert!(sector[HEADER_FIELD_BYTES..].iter().all(|&b| b == 0));
    }

    #[test]
    fn header_round_trip() -> Result<(), HeaderError> {
        let header = sample_header();
        let (decoded, consumed) = Header::decode(&header.encode())?;

        assert_eq!(decoded, header);
        assert_eq!(consumed, SECTOR_BYTES);
        Ok(())
    }

    #[test]
    fn decode_ignores_padding() -> Result<(), HeaderError> {
        let mut sector = sample_header().encode();
        sector[HEADER_FIELD_BYTES..].fill(0xff);

        let (decoded, _) = Header::decode(&sector)?;
        assert_eq!(decoded, sample_header());
        Ok(())
    }

    #[test]
    fn short_sector_is_a_framing_error() {
        let sector = sample_header().encode();

        assert!(matches!(
            Header::decode(&sector[..SECTOR_BYTES - 1]),
            Err(HeaderError::Truncated(2047))
        ));

        let mut cursor = Cursor::new(&sector[..100]);
        assert!(matches!(
            Header::read_from(&mut cursor),
            Err(HeaderError::Truncated(100))
        ));
    }

    #[test]
    fn read_from_consumes_one_sector() -> Result<(), HeaderError> {
        let mut stream = sample_header().encode();
        stream.extend_from_slice(&[0xAA; 4]);
        let mut cursor = Cursor::new(stream);

        assert_eq!(Header::read_from(&mut cursor)?, sample_header());
        assert_eq!(cursor.position(), SECTOR_BYTES as u64);
        Ok(())
    }

    #[test]
    fn validation_errors() {
        let valid = Header {
            format: FORMAT_MONO,
            mark: 1,
            length: 4096,
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let header = Header { format: 0, ..valid.clone() };
        assert!(matches!(header.validate(), Err(HeaderError::InvalidFormat(0))));

        let header = Header { format: 3, ..valid.clone() };
        assert!(matches!(header.validate(), Err(HeaderError::InvalidFormat(3))));

        let header = Header { length: 0, ..valid.clone() };
        assert!(matches!(header.validate(), Err(HeaderError::ZeroLength)));

        let header = Header {
            format: FORMAT_STEREO,
            mark: u32::MAX / 512 + 1,
            length: u32::MAX,
            ..valid.clone()
        };
        assert!(matches!(
            header.validate(),
            Err(HeaderError::MarkTooLarge { max, .. }) if max == u32::MAX / 512
        ));
    }

    #[test]
    fn validation_boundary() {
        for (format, block_frames) in [(FORMAT_MONO, 1024u32), (FORMAT_STEREO, 512)] {
            let length = block_frames * 10 + block_frames / 2;

            let at_end = Header {
                format,
                mark: length / block_frames,
                length,
                ..Default::default()
            };
            assert!(matches!(
                at_end.validate(),
                Err(HeaderError::LoopEndNotAfterMark { end: 10, mark: 10 })
            ));

            let before_end = Header {
                mark: length / block_frames - 1,
                ..at_end
            };
            assert!(before_end.validate().is_ok());
        }
    }

    #[test]
    fn derived_counts() {
        let header = Header {
            format: FORMAT_STEREO,
            mark: 3,
            length: 2000,
            pregap: 2,
            ..Default::default()
        };

        assert_eq!(header.channel_count(), 2);
        assert_eq!(header.mark_samples(), 3072);
        assert_eq!(header.length_samples(), 4000);
        assert_eq!(header.loop_samples(), 928);
        assert_eq!(header.pregap_samples(), 2048);
        // 2000 frames need two sectors per channel
        assert_eq!(header.payload_bytes(), 4 * SECTOR_BYTES as u64);
    }

    #[test]
    fn display_summary() {
        let text = sample_header().to_string();

        assert_eq!(
            text,
            "channel_count : 2\n\
             mark          : 16909060\n\
             length        : 2695938256\n\
             echo_pans     : 11 22 33 44 55 66\n\
             echo_pregap   : 7\n\
             echo_delay    : 8\n\
             echo_levels   : 9 10 11\n\
             pregap        : 12"
        );
    }
}
