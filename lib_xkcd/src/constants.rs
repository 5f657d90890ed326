pub const MAGIC_HEADER: [u8; 4] = *b"XKCD";

/// Magic, file size, header size and info size.
pub const FILE_HEADER_SIZE: usize = 14;

/// Info block length of the first revision: width, height, bit depth.
pub const LEGACY_INFO_SIZE: u16 = 6;
/// Info block length once the compression field was added.
pub const REVISED_INFO_SIZE: u16 = 8;

/// Every palette entry written by the encoder is B, G, R plus a zero byte.
pub const PALETTE_ENTRY_SIZE: usize = 4;
/// Packed palette entries (no reserved byte) found in older files.
pub const PACKED_PALETTE_ENTRY_SIZE: usize = 3;

pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Rows are padded to this many bytes.
pub const ROW_ALIGNMENT: usize = 4;

pub const OPAQUE_ALPHA: u8 = 0xFF;
