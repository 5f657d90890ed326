//! Uniform per-channel quantization.
//!
//! Level tables are built per call and passed around explicitly; nothing
//! here keeps state between encodes.

use crate::image::format::PackedFormat;

/// `2^bits` evenly spaced 8-bit levels, from 0 up to 255.
///
/// `level[i] = floor(i * 255 / (2^bits - 1))`. `bits == 0` yields `[0]`.
/// The last level is always 255, so the clamp in [`quantize`] never fires
/// for these tables. `i * floor(255 / (2^bits - 1))` would not reach 255
/// for 3 bits and is not used.
pub fn generate_levels(bits: u8) -> Vec<u8> {
    let bits = bits.min(8);
    if bits == 0 {
        return vec![0];
    }
    let max = (1u32 << bits) - 1;
    (0..=max).map(|i| (i * 255 / max) as u8).collect()
}

/// Index of the first level not below `sample`, clamped to the last one.
///
/// A sample equal to a level maps to that level's index.
pub fn quantize(levels: &[u8], sample: u8) -> usize {
    levels
        .iter()
        .position(|&level| sample <= level)
        .unwrap_or(levels.len().saturating_sub(1))
}

/// Bit allocation of one channel inside a packed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBits {
    pub bits: u8,
    pub shift: u8,
}

impl ChannelBits {
    const fn new(bits: u8, shift: u8) -> Self {
        Self { bits, shift }
    }

    fn mask(self) -> u8 {
        ((1u16 << self.bits) - 1) as u8
    }

    /// Extracts this channel's index from a packed byte.
    pub fn extract(self, packed: u8) -> usize {
        ((packed >> self.shift) & self.mask()) as usize
    }
}

/// Where red, green and blue live in a packed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedLayout {
    pub red: ChannelBits,
    pub green: ChannelBits,
    pub blue: ChannelBits,
}

impl PackedLayout {
    pub fn of(format: PackedFormat) -> Self {
        match format {
            PackedFormat::Rgb8 => Self {
                red: ChannelBits::new(3, 5),
                green: ChannelBits::new(3, 2),
                blue: ChannelBits::new(2, 0),
            },
            PackedFormat::Bgr8 => Self {
                red: ChannelBits::new(3, 0),
                green: ChannelBits::new(3, 3),
                blue: ChannelBits::new(2, 6),
            },
            PackedFormat::Rgb4Byte => Self {
                red: ChannelBits::new(1, 3),
                green: ChannelBits::new(2, 1),
                blue: ChannelBits::new(1, 0),
            },
            PackedFormat::Bgr4Byte => Self {
                red: ChannelBits::new(1, 0),
                green: ChannelBits::new(2, 1),
                blue: ChannelBits::new(1, 3),
            },
        }
    }
}

/// Level tables for the three channels of a packed format.
#[derive(Debug, Clone)]
pub struct ChannelLevels {
    layout: PackedLayout,
    red: Vec<u8>,
    green: Vec<u8>,
    blue: Vec<u8>,
}

impl ChannelLevels {
    pub fn new(format: PackedFormat) -> Self {
        let layout = PackedLayout::of(format);
        Self {
            layout,
            red: generate_levels(layout.red.bits),
            green: generate_levels(layout.green.bits),
            blue: generate_levels(layout.blue.bits),
        }
    }

    /// Quantizes one true-color pixel into a packed byte. No dithering.
    pub fn pack(&self, r: u8, g: u8, b: u8) -> u8 {
        let r = quantize(&self.red, r) as u8;
        let g = quantize(&self.green, g) as u8;
        let b = quantize(&self.blue, b) as u8;
        (r << self.layout.red.shift) | (g << self.layout.green.shift) | (b << self.layout.blue.shift)
    }

    /// Color a packed byte stands for.
    pub fn unpack(&self, packed: u8) -> [u8; 3] {
        [
            self.red[self.layout.red.extract(packed)],
            self.green[self.layout.green.extract(packed)],
            self.blue[self.layout.blue.extract(packed)],
        ]
    }
}
