/// Sign-magnitude to offset-binary sample mapping.
///
/// Provides the [`SampleTranscoder`](transcode::SampleTranscoder), parameterized
/// by the consumer origin in [`PcmConfig`].
pub mod transcode;

/// Conversion between one on-disk sector and one channel block.
///
/// Provides the [`SectorCodec`](sector::SectorCodec).
pub mod sector;

/// Game PCM to consumer PCM streaming.
///
/// Provides the [`Decoder`](decode::Decoder) with bounded, looped and
/// full-stream decoding, plus [`decode_seek`](decode::decode_seek).
pub mod decode;

/// Consumer PCM to game PCM streaming.
///
/// Provides the [`Encoder`](encode::Encoder), including automatic length
/// back-patching on seekable outputs.
pub mod encode;

/// Size of one on-disk sector in bytes. The header occupies exactly one.
pub const SECTOR_BYTES: usize = 2048;

/// Size of one consumer sample in bytes.
pub const SAMPLE_BYTES: usize = 1;

/// Padding bytes preceding each sample inside a sector.
pub const SAMPLE_PAD_BYTES: usize = 2 - SAMPLE_BYTES;

/// Consumer samples held by one block, which fills exactly one sector.
pub const BLOCK_SAMPLES: usize = SECTOR_BYTES / (SAMPLE_BYTES + SAMPLE_PAD_BYTES);

/// Largest sector count moved by a single relative seek.
///
/// Keeps every seek offset within 32 bits regardless of the mark value.
pub const SEEK_STEP_SECTORS: u32 = u32::MAX / SECTOR_BYTES as u32;

/// Consumer PCM profile.
///
/// `origin` is the consumer value of silence: `0x80` for unsigned 8-bit PCM,
/// `0x00` for signed 8-bit PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmConfig {
    pub origin: u8,
}

impl PcmConfig {
    pub const UNSIGNED: Self = Self { origin: 0x80 };
    pub const SIGNED: Self = Self { origin: 0x00 };

    pub fn with_signed(signed: bool) -> Self {
        if signed { Self::SIGNED } else { Self::UNSIGNED }
    }
}

impl Default for PcmConfig {
    fn default() -> Self {
        Self::UNSIGNED
    }
}

#[test]
fn block_fills_one_sector() {
    assert_eq!(BLOCK_SAMPLES, 1024);
    assert_eq!(BLOCK_SAMPLES * (SAMPLE_BYTES + SAMPLE_PAD_BYTES), SECTOR_BYTES);
    assert_eq!(SEEK_STEP_SECTORS, 2_097_151);
    assert_eq!(PcmConfig::default(), PcmConfig::UNSIGNED);
    assert_eq!(PcmConfig::with_signed(true).origin, 0);
}
