#![allow(dead_code)]

use lib_xkcd::{init_logging, Palette};
use log::LevelFilter;

/// 4x4 BGR pixels, three distinct colors
pub const RANDOM_RGB: [u8; 48] = [
    255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 0, 0, //
    0, 255, 0, 0, 0, 255, 255, 0, 0, 0, 255, 0, //
    0, 0, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, //
    255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 0, 0, //
];

/// 5x3 mono image, one byte per row
pub const MONO_ROWS: [u8; 3] = [0b1010_1000, 0b0101_0000, 0b1111_1000];

pub fn setup() {
    init_logging(LevelFilter::Debug);
}

/// `width` x `height` 8-bit ramp, each row shifted by its index
pub fn gradient(width: u16, height: u16) -> Vec<u8> {
    (0..height as usize)
        .flat_map(|y| (0..width as usize).map(move |x| ((x * 16 + y) % 256) as u8))
        .collect()
}

/// True-color pixels with every channel varying
pub fn true_color(width: u16, height: u16) -> Vec<u8> {
    (0..height as usize * width as usize)
        .flat_map(|i| [(i * 7) as u8, (i * 13 + 50) as u8, 255u8.wrapping_sub((i * 3) as u8)])
        .collect()
}

/// Opaque palette of `entries` distinct colors
pub fn palette(entries: usize) -> Palette {
    Palette::new(
        (0..entries)
            .map(|i| [i as u8, (255 - i) as u8, (i * 3) as u8, 0xFF])
            .collect(),
    )
}

/// Hand-built file: 14-byte file header, info block, palette space, rows.
pub struct RawFile {
    pub file_size: Option<u32>,
    pub info: Vec<u8>,
    pub palette: Vec<u8>,
    pub rows: Vec<u8>,
}

impl RawFile {
    pub fn legacy(width: u16, height: u16, depth: u16) -> Self {
        let mut info = Vec::new();
        for field in [width, height, depth] {
            info.extend_from_slice(&field.to_le_bytes());
        }
        Self {
            file_size: None,
            info,
            palette: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn revised(width: u16, height: u16, depth: u16, compression: u16) -> Self {
        let mut file = Self::legacy(width, height, depth);
        file.info.extend_from_slice(&compression.to_le_bytes());
        file
    }

    pub fn build(&self) -> Vec<u8> {
        let header_size = 14 + self.info.len() + self.palette.len();
        let file_size = self
            .file_size
            .unwrap_or((header_size + self.rows.len()) as u32);

        let mut data = b"XKCD".to_vec();
        data.extend_from_slice(&file_size.to_le_bytes());
        data.extend_from_slice(&(header_size as u32).to_le_bytes());
        data.extend_from_slice(&(self.info.len() as u16).to_le_bytes());
        data.extend_from_slice(&self.info);
        data.extend_from_slice(&self.palette);
        data.extend_from_slice(&self.rows);
        data
    }
}
