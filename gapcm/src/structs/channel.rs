//! Channel layouts and per-channel block buffers.

use crate::process::BLOCK_SAMPLES;

/// Stream format code for stereo streams.
pub const FORMAT_STEREO: u16 = 1;

/// Stream format code for mono streams.
pub const FORMAT_MONO: u16 = 2;

/// Channel layout selected by the header's format code.
///
/// The codes are fixed by the container: `1` is stereo and `2` is mono.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Stereo,
    Mono,
}

impl ChannelLayout {
    pub fn from_format(format: u16) -> Option<Self> {
        match format {
            FORMAT_STEREO => Some(Self::Stereo),
            FORMAT_MONO => Some(Self::Mono),
            _ => None,
        }
    }

    pub fn from_channel_count(channels: u16) -> Option<Self> {
        match channels {
            1 => Some(Self::Mono),
            2 => Some(Self::Stereo),
            _ => None,
        }
    }

    pub fn format(self) -> u16 {
        match self {
            Self::Stereo => FORMAT_STEREO,
            Self::Mono => FORMAT_MONO,
        }
    }

    pub fn channel_count(self) -> usize {
        match self {
            Self::Stereo => 2,
            Self::Mono => 1,
        }
    }

    /// Frames spanned by one block.
    pub fn block_frames(self) -> u32 {
        (BLOCK_SAMPLES / self.channel_count()) as u32
    }
}

/// One channel's consumer samples for the current round.
#[derive(Debug, Clone)]
pub struct ChannelBlock {
    pub samples: Vec<u8>,
    /// Usable samples at the front of `samples`.
    pub count: usize,
}

impl ChannelBlock {
    fn new() -> Self {
        Self {
            samples: vec![0; BLOCK_SAMPLES],
            count: 0,
        }
    }

    /// Fills the unused tail with `origin` so the whole block can be encoded.
    pub fn pad(&mut self, origin: u8) {
        self.samples[self.count..].fill(origin);
    }
}

/// Block buffers indexed by channel number, scoped to one stream call.
#[derive(Debug, Clone)]
pub struct ChannelBlocks {
    blocks: Vec<ChannelBlock>,
}

impl ChannelBlocks {
    pub fn new(layout: ChannelLayout) -> Self {
        Self {
            blocks: (0..layout.channel_count())
                .map(|_| ChannelBlock::new())
                .collect(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ChannelBlock> {
        self.blocks.iter_mut()
    }

    pub fn clear(&mut self) {
        self.blocks.iter_mut().for_each(|block| block.count = 0);
    }

    /// Appends frame-interleaved samples to `dst`.
    ///
    /// Channel 0 bounds the frame count; a later channel with fewer samples
    /// contributes `origin` for the frames it lacks.
    pub fn interleave(&self, origin: u8, dst: &mut Vec<u8>) {
        let frames = self.blocks.first().map_or(0, |block| block.count);
        dst.reserve(frames * self.blocks.len());
        for frame in 0..frames {
            for block in &self.blocks {
                dst.push(if frame < block.count {
                    block.samples[frame]
                } else {
                    origin
                });
            }
        }
    }

    /// Distributes frame-interleaved samples across the channels, replacing
    /// the previous round. A trailing partial frame fills the leading
    /// channels only.
    pub fn deinterleave(&mut self, src: &[u8]) {
        self.clear();
        let channels = self.blocks.len();
        for (i, &sample) in src.iter().enumerate() {
            let block = &mut self.blocks[i % channels];
            block.samples[block.count] = sample;
            block.count += 1;
        }
    }
}

impl std::ops::Index<usize> for ChannelBlocks {
    type Output = ChannelBlock;

    fn index(&self, channel: usize) -> &Self::Output {
        &self.blocks[channel]
    }
}

impl std::ops::IndexMut<usize> for ChannelBlocks {
    fn index_mut(&mut self, channel: usize) -> &mut Self::Output {
        &mut self.blocks[channel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_codes_are_inverted() {
        assert_eq!(ChannelLayout::from_format(1), Some(ChannelLayout::Stereo));
        assert_eq!(ChannelLayout::from_format(2), Some(ChannelLayout::Mono));
        assert_eq!(ChannelLayout::from_format(0), None);
        assert_eq!(ChannelLayout::from_format(3), None);
        assert_eq!(ChannelLayout::from_channel_count(1).map(|l| l.format()), Some(2));
        assert_eq!(ChannelLayout::from_channel_count(2).map(|l| l.format()), Some(1));
        assert_eq!(ChannelLayout::from_channel_count(3), None);
        assert_eq!(ChannelLayout::Mono.block_frames(), 1024);
        assert_eq!(ChannelLayout::Stereo.block_frames(), 512);
    }

    #[test]
    fn interleave_pads_short_channels() {
        let mut blocks = ChannelBlocks::new(ChannelLayout::Stereo);
        blocks[0].samples[..3].copy_from_slice(&[1, 2, 3]);
        blocks[0].count = 3;
        blocks[1].samples[..1].copy_from_slice(&[9]);
        blocks[1].count = 1;

        let mut out = Vec::new();
        blocks.interleave(0x80, &mut out);
        assert_eq!(out, vec![1, 9, 2, 0x80, 3, 0x80]);
    }

    #[test]
    fn interleave_is_bounded_by_first_channel() {
        let mut blocks = ChannelBlocks::new(ChannelLayout::Stereo);
        blocks[0].count = 0;
        blocks[1].count = 5;

        let mut out = Vec::new();
        blocks.interleave(0x80, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn deinterleave_splits_round_robin() {
        let mut blocks = ChannelBlocks::new(ChannelLayout::Stereo);
        blocks.deinterleave(&[1, 2, 3, 4, 5]);

        assert_eq!(&blocks[0].samples[..blocks[0].count], &[1, 3, 5]);
        assert_eq!(&blocks[1].samples[..blocks[1].count], &[2, 4]);

        blocks[1].pad(0x80);
        assert_eq!(&blocks[1].samples[..4], &[2, 4, 0x80, 0x80]);
        assert!(blocks[1].samples.iter().skip(2).all(|&s| s == 0x80));
    }
}
