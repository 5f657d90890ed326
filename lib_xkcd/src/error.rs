use std::collections::TryReserveError;

use thiserror::Error;

/// Reasons a header is rejected as malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("input too short for a file header: {0} bytes")]
    TooShort(usize),
    #[error("illegal filetype information in header: {0:?}")]
    BadMagic([u8; 4]),
    #[error("declared file size is not larger than header size ({file_size} <= {header_size})")]
    SizeMismatch { file_size: u32, header_size: u32 },
    #[error("header size {header_size} is smaller than the fixed header fields ({base})")]
    HeaderTooSmall { header_size: u32, base: usize },
    #[error("unknown info block size {0}")]
    UnknownInfoSize(u16),
    #[error("unsupported bit depth {0}")]
    UnsupportedBitDepth(u16),
    #[error("palette of {entries} entries doesn't fit in {available} bytes")]
    PaletteDoesNotFit { entries: usize, available: usize },
    #[error("failed to read header fields: {0}")]
    Fields(String),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] HeaderError),
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("buffer too small: need {needed} bytes, got {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("frame allocation failed")]
    AllocationFailure(#[from] TryReserveError),
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },
    #[error("missing or oversized palette for palettized output")]
    MissingPalette,
}

impl CodecError {
    pub(crate) fn too_small(needed: usize, available: usize) -> Self {
        CodecError::BufferTooSmall { needed, available }
    }
}
