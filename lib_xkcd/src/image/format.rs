use serde::{Deserialize, Serialize};

use crate::constants::{LEGACY_INFO_SIZE, REVISED_INFO_SIZE};
use crate::pixels::palette::Palette;
use crate::pixels::rows::visible_row_bytes;

/// Revision of the container layout, picked from the info block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormatVersion {
    /// Width, height and depth only. Rows are stored bottom-up.
    Legacy,
    /// Adds the compression field. Rows are stored top-down.
    #[default]
    Revised,
}

impl FormatVersion {
    pub fn from_info_size(info_size: u16) -> Option<Self> {
        match info_size {
            LEGACY_INFO_SIZE => Some(FormatVersion::Legacy),
            REVISED_INFO_SIZE => Some(FormatVersion::Revised),
            _ => None,
        }
    }

    pub fn info_size(self) -> u16 {
        match self {
            FormatVersion::Legacy => LEGACY_INFO_SIZE,
            FormatVersion::Revised => REVISED_INFO_SIZE,
        }
    }

    pub fn orientation(self) -> Orientation {
        match self {
            FormatVersion::Legacy => Orientation::BottomUp,
            FormatVersion::Revised => Orientation::TopDown,
        }
    }
}

/// Order of the rows inside the file. Memory is always top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Last scanline first.
    BottomUp,
    TopDown,
}

impl Orientation {
    /// Maps the n-th row in the file to its row in memory.
    pub fn memory_row(self, file_row: usize, height: usize) -> usize {
        match self {
            Orientation::BottomUp => height - 1 - file_row,
            Orientation::TopDown => file_row,
        }
    }
}

/// Value of the compression field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Compression {
    Rgb = 0,
    Rle8 = 1,
    Rle4 = 2,
    Bitfields = 3,
}

impl TryFrom<u16> for Compression {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Compression::Rgb),
            1 => Ok(Compression::Rle8),
            2 => Ok(Compression::Rle4),
            3 => Ok(Compression::Bitfields),
            other => Err(other),
        }
    }
}

/// 8-bit formats that pack all three channels into one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackedFormat {
    /// 3-3-2, red in the high bits.
    Rgb8,
    /// 2-3-3, blue in the high bits.
    Bgr8,
    /// 1-2-1 in the low nibble, red high.
    Rgb4Byte,
    /// 1-2-1 in the low nibble, blue high.
    Bgr4Byte,
}

/// Pixel layout of a frame in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 1 bit per pixel, 0 is black and 1 is white.
    Monoblack,
    /// 8-bit index into a caller-supplied palette.
    Pal8,
    Rgb8,
    Bgr8,
    Rgb4Byte,
    Bgr4Byte,
    Gray8,
    Rgb24,
    Bgr24,
}

impl PixelFormat {
    /// Bits one pixel occupies in memory.
    pub fn bits_per_pixel(self) -> u16 {
        match self {
            PixelFormat::Monoblack => 1,
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => 24,
            _ => 8,
        }
    }

    pub fn packed(self) -> Option<PackedFormat> {
        match self {
            PixelFormat::Rgb8 => Some(PackedFormat::Rgb8),
            PixelFormat::Bgr8 => Some(PackedFormat::Bgr8),
            PixelFormat::Rgb4Byte => Some(PackedFormat::Rgb4Byte),
            PixelFormat::Bgr4Byte => Some(PackedFormat::Bgr4Byte),
            _ => None,
        }
    }

    pub fn is_true_color(self) -> bool {
        matches!(self, PixelFormat::Rgb24 | PixelFormat::Bgr24)
    }

    /// Format a decoded image of this bit depth is handed back in.
    pub fn for_bit_depth(bit_depth: u16) -> Option<Self> {
        match bit_depth {
            1 => Some(PixelFormat::Monoblack),
            8 => Some(PixelFormat::Pal8),
            24 => Some(PixelFormat::Bgr24),
            _ => None,
        }
    }
}

/// How true-color frames are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrueColorTarget {
    /// 24 bits per pixel, B, G, R.
    #[default]
    Direct,
    /// Quantized to one byte per pixel with a systematic palette.
    Packed(PackedFormat),
}

/// A decoded image. Rows are top-down, `stride` bytes apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
    pub stride: usize,
    pub data: Vec<u8>,
    pub palette: Option<Palette>,
}

impl Frame {
    /// Visible bytes of row `y`, without the padding.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.row_bytes()]
    }

    pub fn row_bytes(&self) -> usize {
        visible_row_bytes(self.width, self.format.bits_per_pixel())
    }

    pub fn view(&self) -> FrameRef<'_> {
        FrameRef {
            width: self.width,
            height: self.height,
            format: self.format,
            stride: self.stride,
            data: &self.data,
            palette: self.palette.as_ref(),
        }
    }
}

/// Borrowed frame handed to the encoder.
#[derive(Debug, Clone, Copy)]
pub struct FrameRef<'a> {
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
    pub stride: usize,
    pub data: &'a [u8],
    pub palette: Option<&'a Palette>,
}

impl<'a> FrameRef<'a> {
    /// Tightly packed rows, no palette.
    pub fn new(width: u16, height: u16, format: PixelFormat, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            format,
            stride: visible_row_bytes(width, format.bits_per_pixel()),
            data,
            palette: None,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_palette(mut self, palette: &'a Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn row_bytes(&self) -> usize {
        visible_row_bytes(self.width, self.format.bits_per_pixel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_info_size() {
        assert_eq!(FormatVersion::from_info_size(6), Some(FormatVersion::Legacy));
        assert_eq!(FormatVersion::from_info_size(8), Some(FormatVersion::Revised));
        assert_eq!(FormatVersion::from_info_size(40), None);
    }

    #[test]
    fn test_orientation_memory_row() {
        assert_eq!(Orientation::BottomUp.memory_row(0, 3), 2);
        assert_eq!(Orientation::BottomUp.memory_row(2, 3), 0);
        assert_eq!(Orientation::TopDown.memory_row(1, 3), 1);
    }

    #[test]
    fn test_compression_tags() {
        assert_eq!(Compression::try_from(0), Ok(Compression::Rgb));
        assert_eq!(Compression::try_from(2), Ok(Compression::Rle4));
        assert_eq!(Compression::try_from(9), Err(9));
    }

    #[test]
    fn test_frame_ref_tight_stride() {
        let data = [0u8; 30];
        let frame = FrameRef::new(5, 2, PixelFormat::Rgb24, &data);
        assert_eq!(frame.stride, 15);
        let mono = FrameRef::new(9, 1, PixelFormat::Monoblack, &data);
        assert_eq!(mono.stride, 2);
    }
}
