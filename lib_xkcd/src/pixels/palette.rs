use log::{debug, error};

use crate::constants::{
    MAX_PALETTE_ENTRIES, OPAQUE_ALPHA, PACKED_PALETTE_ENTRY_SIZE, PALETTE_ENTRY_SIZE,
};
use crate::error::HeaderError;
use crate::image::format::PackedFormat;
use crate::pixels::quantize::ChannelLevels;

/// Color lookup table, RGBA entries indexed by pixel value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 4]>,
}

/// Width of one stored palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteLayout {
    /// B, G, R
    Packed,
    /// B, G, R, reserved
    Padded,
}

impl PaletteLayout {
    /// Picks the entry width from the space between the fixed header
    /// fields and the pixel data.
    pub fn infer(entries: usize, available: usize) -> Result<Self, HeaderError> {
        if available >= entries * PALETTE_ENTRY_SIZE {
            Ok(PaletteLayout::Padded)
        } else if available >= entries * PACKED_PALETTE_ENTRY_SIZE {
            Ok(PaletteLayout::Packed)
        } else {
            Err(HeaderError::PaletteDoesNotFit { entries, available })
        }
    }

    pub fn entry_size(self) -> usize {
        match self {
            PaletteLayout::Packed => PACKED_PALETTE_ENTRY_SIZE,
            PaletteLayout::Padded => PALETTE_ENTRY_SIZE,
        }
    }
}

impl Palette {
    pub fn new(entries: Vec<[u8; 4]>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[[u8; 4]] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<[u8; 4]> {
        self.entries.get(index).copied()
    }

    /// Two entries, black then white.
    pub fn monoblack() -> Self {
        Self::new(vec![[0, 0, 0, OPAQUE_ALPHA], [0xFF, 0xFF, 0xFF, OPAQUE_ALPHA]])
    }

    /// 256 gray levels, index equals intensity.
    pub fn grayscale() -> Self {
        Self::new(
            (0..=255u8)
                .map(|i| [i, i, i, OPAQUE_ALPHA])
                .collect(),
        )
    }

    /// One entry per byte value of a packed color format.
    pub fn systematic(format: PackedFormat) -> Self {
        let levels = ChannelLevels::new(format);
        Self::new(
            (0..=255u8)
                .map(|i| {
                    let [r, g, b] = levels.unpack(i);
                    [r, g, b, OPAQUE_ALPHA]
                })
                .collect(),
        )
    }

    /// Reads `entries` colors from the start of `data`, where `data` is all
    /// the space the header leaves for the palette. Alpha is forced opaque.
    pub fn read(data: &[u8], entries: usize) -> Result<Self, HeaderError> {
        let layout = PaletteLayout::infer(entries, data.len()).map_err(|e| {
            error!("Palette doesn't fit in header: {}", e);
            e
        })?;
        debug!(
            "Reading {} palette entries of {} bytes",
            entries,
            layout.entry_size()
        );

        let colors = data
            .chunks_exact(layout.entry_size())
            .take(entries)
            .map(|bgr| [bgr[2], bgr[1], bgr[0], OPAQUE_ALPHA])
            .collect();

        Ok(Self::new(colors))
    }

    /// Bytes `write` produces for a table of `entries` colors.
    pub fn stored_size(entries: usize) -> usize {
        entries * PALETTE_ENTRY_SIZE
    }

    /// Writes `entries` 4-byte entries (B, G, R, 0); missing colors are
    /// written as black.
    pub fn write(&self, out: &mut [u8], entries: usize) {
        for (i, slot) in out
            .chunks_exact_mut(PALETTE_ENTRY_SIZE)
            .take(entries)
            .enumerate()
        {
            let [r, g, b, _] = self.get(i).unwrap_or([0, 0, 0, 0]);
            slot.copy_from_slice(&[b, g, r, 0]);
        }
    }

    pub fn fits_depth(&self, bit_depth: u16) -> bool {
        self.len() <= MAX_PALETTE_ENTRIES.min(1 << bit_depth)
    }
}
