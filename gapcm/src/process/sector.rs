//! Sector and block conversion.
//!
//! A sector holds one channel's block in game form. Every sample takes a
//! two-byte unit, a padding byte followed by the sample byte, which leaves
//! room for 16-bit samples without changing the sector size.

use super::transcode::SampleTranscoder;
use super::{PcmConfig, SAMPLE_BYTES, SAMPLE_PAD_BYTES};

const UNIT_BYTES: usize = SAMPLE_BYTES + SAMPLE_PAD_BYTES;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectorCodec {
    transcoder: SampleTranscoder,
}

impl SectorCodec {
    pub fn new(config: PcmConfig) -> Self {
        Self {
            transcoder: SampleTranscoder::new(config),
        }
    }

    #[inline(always)]
    pub fn origin(&self) -> u8 {
        self.transcoder.origin()
    }

    /// Decodes the sector bytes actually read into `block` and returns the
    /// sample count.
    ///
    /// A short sector yields `sector.len() / 2` samples; an odd trailing byte
    /// is a padding byte without its sample and is ignored. Output is also
    /// bounded by `block.len()`.
    pub fn decode_sector(&self, sector: &[u8], block: &mut [u8]) -> usize {
        let mut count = 0;
        for (sample, unit) in block.iter_mut().zip(sector.chunks_exact(UNIT_BYTES)) {
            *sample = self.transcoder.decode_sample(unit[SAMPLE_PAD_BYTES]);
            count += 1;
        }
        count
    }

    /// Encodes `block` into `sector` and returns the byte count, two per
    /// sample. Output is bounded by `sector.len()`.
    pub fn encode_sector(&self, block: &[u8], sector: &mut [u8]) -> usize {
        let mut count = 0;
        for (unit, &sample) in sector.chunks_exact_mut(UNIT_BYTES).zip(block) {
            unit[..SAMPLE_PAD_BYTES].fill(0);
            unit[SAMPLE_PAD_BYTES] = self.transcoder.encode_sample(sample);
            count += UNIT_BYTES;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{BLOCK_SAMPLES, SECTOR_BYTES};

    fn check_sector(config: PcmConfig, sector: [u8; 4]) {
        let codec = SectorCodec::new(config);
        let t = SampleTranscoder::new(config);
        let answer = [t.decode_sample(sector[1]), t.decode_sample(sector[3])];

        let mut decoded = [0xab, 0xcd, 0xef, 0xbc];
        let decode_count = codec.decode_sector(&sector, &mut decoded);
        assert_eq!(decode_count, 2);
        assert_eq!(&decoded[..2], &answer);
        assert_eq!(&decoded[2..], &[0xef, 0xbc], "bytes past the count are untouched");

        let mut encoded = [0xab, 0xcd, 0xef, 0xbc];
        let encode_count = codec.encode_sector(&decoded[..decode_count], &mut encoded);
        assert_eq!(encode_count, 4);
        for unit in 0..2 {
            assert_eq!(encoded[unit * 2], 0);
            assert_eq!(encoded[unit * 2 + 1], sector[unit * 2 + 1]);
        }
    }

    #[test]
    fn small_sectors_round_trip() {
        let sectors = [
            [0xab, 0xcd, 0xef, 0xbc],
            [0xbc, 0xef, 0xcd, 0xab],
            [0xcd, 0xab, 0xbc, 0xef],
            [0xef, 0xbc, 0xab, 0xcd],
            [0x00, 0x7f, 0x80, 0xff],
            [0xff, 0x80, 0x7f, 0x00],
            [0x7f, 0x00, 0xff, 0x80],
            [0x80, 0xff, 0x00, 0x7f],
        ];

        for config in [PcmConfig::UNSIGNED, PcmConfig::SIGNED] {
            for sector in sectors {
                check_sector(config, sector);
            }
        }
    }

    #[test]
    fn full_sector_round_trip() {
        let codec = SectorCodec::default();
        let sector: Vec<u8> = (0..SECTOR_BYTES).map(|i| (i * 37 + 11) as u8).collect();

        let mut block = vec![0u8; BLOCK_SAMPLES];
        assert_eq!(codec.decode_sector(&sector, &mut block), BLOCK_SAMPLES);

        let mut encoded = vec![0xffu8; SECTOR_BYTES];
        assert_eq!(codec.encode_sector(&block, &mut encoded), SECTOR_BYTES);
        for (i, (&got, &want)) in encoded.iter().zip(&sector).enumerate() {
            if i % 2 == 1 {
                assert_eq!(got, want, "sample byte at offset {i}");
            } else {
                assert_eq!(got, 0, "pad byte at offset {i}");
            }
        }

        let mut redecoded = vec![0u8; BLOCK_SAMPLES];
        codec.decode_sector(&encoded, &mut redecoded);
        assert_eq!(redecoded, block);
    }

    #[test]
    fn short_sector_yields_short_block() {
        let codec = SectorCodec::default();
        let mut block = vec![0u8; BLOCK_SAMPLES];

        assert_eq!(codec.decode_sector(&[0x00, 0x80, 0x00], &mut block), 1);
        assert_eq!(block[0], 0x80);
        assert_eq!(codec.decode_sector(&[], &mut block), 0);
    }

    #[test]
    fn partial_block_encodes_partial_sector() {
        let codec = SectorCodec::default();
        let block = [0x80u8, 0x81, 0x7f];
        let mut sector = vec![0xeeu8; SECTOR_BYTES];

        assert_eq!(codec.encode_sector(&block, &mut sector), 6);
        assert_eq!(&sector[..6], &[0x00, 0x80, 0x00, 0x81, 0x00, 0x00]);
        assert_eq!(sector[6], 0xee);
    }
}
