//! Sample transcoding.
//!
//! Game PCM stores each sample in sign-magnitude form: bit 7 is the sign, set
//! for non-negative values, and bits 0-6 hold the magnitude. Codes
//! `[0x00, 0x7f]` map to `[-1, -128]` and `[0x80, 0xff]` map to `[0, 127]`.
//! Consumer PCM is offset binary around the configured origin.

use super::PcmConfig;

/// Stateless, total mapping between game and consumer samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTranscoder {
    origin: u8,
}

impl SampleTranscoder {
    pub fn new(config: PcmConfig) -> Self {
        Self {
            origin: config.origin,
        }
    }

    #[inline(always)]
    pub fn origin(&self) -> u8 {
        self.origin
    }

    /// Translates a game sample to consumer form.
    #[inline(always)]
    pub fn decode_sample(&self, sample: u8) -> u8 {
        let magnitude = sample & 0x7f;
        if sample & 0x80 != 0 {
            self.origin.wrapping_add(magnitude)
        } else {
            self.origin.wrapping_sub(magnitude).wrapping_sub(1)
        }
    }

    /// Translates a consumer sample to game form. Exact inverse of
    /// [`decode_sample`](Self::decode_sample).
    #[inline(always)]
    pub fn encode_sample(&self, sample: u8) -> u8 {
        let offset = sample.wrapping_sub(self.origin);
        if offset & 0x80 == 0 {
            0x80 | offset
        } else {
            !offset & 0x7f
        }
    }
}

impl Default for SampleTranscoder {
    fn default() -> Self {
        Self::new(PcmConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_decode(origin: u8, sample: u8) -> u8 {
        if sample < 0x80 {
            origin.wrapping_sub(1).wrapping_sub(sample)
        } else {
            origin.wrapping_add(sample - 0x80)
        }
    }

    fn check_profile(config: PcmConfig) {
        let transcoder = SampleTranscoder::new(config);
        let mut seen = [false; 256];

        for sample in 0..=u8::MAX {
            let decoded = transcoder.decode_sample(sample);
            assert_eq!(decoded, expected_decode(config.origin, sample));
            assert_eq!(transcoder.encode_sample(decoded), sample);
            assert!(!seen[decoded as usize], "{decoded:#04x} decoded twice");
            seen[decoded as usize] = true;
        }

        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn unsigned_profile_is_bijective() {
        check_profile(PcmConfig::UNSIGNED);
    }

    #[test]
    fn signed_profile_is_bijective() {
        check_profile(PcmConfig::SIGNED);
    }

    #[test]
    fn consumer_round_trip_for_any_origin() {
        for origin in [0x00, 0x01, 0x40, 0x7f, 0x80, 0xc3, 0xff] {
            let transcoder = SampleTranscoder::new(PcmConfig { origin });
            for sample in 0..=u8::MAX {
                let encoded = transcoder.encode_sample(sample);
                assert_eq!(transcoder.decode_sample(encoded), sample);
            }
        }
    }

    #[test]
    fn silence_and_extremes() {
        let unsigned = SampleTranscoder::new(PcmConfig::UNSIGNED);
        assert_eq!(unsigned.decode_sample(0x80), 0x80);
        assert_eq!(unsigned.decode_sample(0x00), 0x7f);
        assert_eq!(unsigned.decode_sample(0x7f), 0x00);
        assert_eq!(unsigned.decode_sample(0xff), 0xff);
        assert_eq!(unsigned.encode_sample(0x80), 0x80);

        let signed = SampleTranscoder::new(PcmConfig::SIGNED);
        assert_eq!(signed.decode_sample(0x80), 0x00);
        assert_eq!(signed.decode_sample(0x00) as i8, -1);
        assert_eq!(signed.decode_sample(0x7f) as i8, -128);
        assert_eq!(signed.decode_sample(0xff) as i8, 127);
        assert_eq!(signed.encode_sample(0x00), 0x80);
    }
}
