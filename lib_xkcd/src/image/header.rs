use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use super::format::{Compression, FormatVersion, PixelFormat};
use crate::constants::{FILE_HEADER_SIZE, MAGIC_HEADER};
use crate::error::{CodecError, HeaderError};
use crate::pixels::palette::Palette;
use crate::pixels::rows::RowLayout;

/// First 14 bytes of every file.
#[derive(Serialize, Deserialize, Debug)]
struct FileHeader {
    magic: [u8; 4],
    file_size: u32,
    header_size: u32,
    info_size: u16,
}

#[derive(Serialize, Deserialize, Debug)]
struct LegacyInfo {
    width: u16,
    height: u16,
    bit_depth: u16,
}

#[derive(Serialize, Deserialize, Debug)]
struct RevisedInfo {
    width: u16,
    height: u16,
    bit_depth: u16,
    compression: u16,
}

/// Parsed and validated header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: FormatVersion,
    /// File size as stored in the header.
    pub declared_file_size: u32,
    /// File size after clamping to the input length.
    pub file_size: u32,
    /// Offset of the pixel data.
    pub header_size: u32,
    pub width: u16,
    pub height: u16,
    pub bit_depth: u16,
    pub compression: Compression,
    pub pixel_format: PixelFormat,
}

fn fields_error(e: bincode::Error) -> CodecError {
    error!("Failed to read header fields: {}", e);
    HeaderError::Fields(e.to_string()).into()
}

fn check_bit_depth(bit_depth: u16) -> Result<PixelFormat, HeaderError> {
    PixelFormat::for_bit_depth(bit_depth).ok_or_else(|| {
        error!("Unsupported bit depth {}", bit_depth);
        HeaderError::UnsupportedBitDepth(bit_depth)
    })
}

impl Header {
    /// Bytes taken by the file header and the info block.
    pub fn base_size(&self) -> usize {
        FILE_HEADER_SIZE + self.version.info_size() as usize
    }

    /// Palette length implied by the bit depth, `None` for true color.
    pub fn palette_entries(&self) -> Option<usize> {
        (self.bit_depth <= 8).then(|| 1usize << self.bit_depth)
    }

    pub fn row_layout(&self) -> RowLayout {
        RowLayout::new(self.width, self.height, self.bit_depth)
    }

    /// Parses the header at the start of `input`.
    ///
    /// An overstated file size is clamped to `input.len()` unless
    /// `strict_file_size` is set, in which case it is an error.
    pub fn parse(input: &[u8], strict_file_size: bool) -> Result<Self, CodecError> {
        // Check initial header size
        if input.len() < FILE_HEADER_SIZE {
            error!("buf size too small ({})", input.len());
            return Err(HeaderError::TooShort(input.len()).into());
        }

        let file_header: FileHeader =
            bincode::deserialize(&input[..FILE_HEADER_SIZE]).map_err(fields_error)?;

        if file_header.magic != MAGIC_HEADER {
            error!("Illegal filetype information in header");
            return Err(HeaderError::BadMagic(file_header.magic).into());
        }
        debug!("Magic number validated successfully");

        let declared_file_size = file_header.file_size;
        let mut file_size = declared_file_size;
        if file_size as usize > input.len() {
            if strict_file_size {
                error!(
                    "Not enough data ({} < {})",
                    input.len(),
                    declared_file_size
                );
                return Err(CodecError::too_small(file_size as usize, input.len()));
            }
            warn!(
                "Not enough data ({} < {}), trying to decode anyway",
                input.len(),
                declared_file_size
            );
            // Input length is below 4GiB here since it's smaller than a u32
            file_size = input.len() as u32;
        }

        let header_size = file_header.header_size;
        if file_size <= header_size {
            error!(
                "Declared file size is less than header size ({} <= {})",
                file_size, header_size
            );
            return Err(HeaderError::SizeMismatch {
                file_size,
                header_size,
            }
            .into());
        }

        let version = FormatVersion::from_info_size(file_header.info_size).ok_or_else(|| {
            error!("Unknown info block size {}", file_header.info_size);
            HeaderError::UnknownInfoSize(file_header.info_size)
        })?;
        debug!("Header revision {:?}", version);

        let base = FILE_HEADER_SIZE + version.info_size() as usize;
        if input.len() < base {
            error!("Input ends inside the info block ({} < {})", input.len(), base);
            return Err(CodecError::too_small(base, input.len()));
        }
        if (header_size as usize) < base {
            error!("Header size {} overlaps the info block", header_size);
            return Err(HeaderError::HeaderTooSmall { header_size, base }.into());
        }

        let info = &input[FILE_HEADER_SIZE..base];
        let (width, height, bit_depth, raw_compression) = match version {
            FormatVersion::Legacy => {
                let info: LegacyInfo = bincode::deserialize(info).map_err(fields_error)?;
                (info.width, info.height, info.bit_depth, None)
            }
            FormatVersion::Revised => {
                let info: RevisedInfo = bincode::deserialize(info).map_err(fields_error)?;
                (info.width, info.height, info.bit_depth, Some(info.compression))
            }
        };
        debug!(
            "Image dimensions read: width={} height={} depth={}",
            width, height, bit_depth
        );

        let pixel_format = check_bit_depth(bit_depth)?;

        let compression = match raw_compression.map(Compression::try_from) {
            None | Some(Ok(Compression::Rgb)) => Compression::Rgb,
            Some(Ok(other)) => {
                error!("Compression {:?} is not implemented", other);
                return Err(CodecError::UnsupportedFeature(format!(
                    "compression {:?}",
                    other
                )));
            }
            Some(Err(raw)) => {
                error!("Unknown compression value {}", raw);
                return Err(CodecError::UnsupportedFeature(format!(
                    "unknown compression {}",
                    raw
                )));
            }
        };

        Ok(Header {
            version,
            declared_file_size,
            file_size,
            header_size,
            width,
            height,
            bit_depth,
            compression,
            pixel_format,
        })
    }

    /// Builds the header for an uncompressed image with `palette_entries`
    /// stored colors.
    pub fn for_image(
        version: FormatVersion,
        width: u16,
        height: u16,
        bit_depth: u16,
        palette_entries: usize,
    ) -> Result<Self, CodecError> {
        if width == 0 || height == 0 {
            error!("Refusing to encode an empty {}x{} image", width, height);
            return Err(CodecError::InvalidDimensions { width, height });
        }
        let pixel_format = check_bit_depth(bit_depth)?;

        let base = FILE_HEADER_SIZE + version.info_size() as usize;
        let header_size = (base + Palette::stored_size(palette_entries)) as u64;
        let file_size = header_size + RowLayout::new(width, height, bit_depth).image_size() as u64;
        let file_size = u32::try_from(file_size).map_err(|_| {
            error!("Encoded size {} doesn't fit the size field", file_size);
            CodecError::InvalidDimensions { width, height }
        })?;

        Ok(Header {
            version,
            declared_file_size: file_size,
            file_size,
            header_size: header_size as u32,
            width,
            height,
            bit_depth,
            compression: Compression::Rgb,
            pixel_format,
        })
    }

    /// Writes the file header and info block to the start of `out`.
    pub fn write(&self, out: &mut [u8]) -> Result<(), CodecError> {
        let base = self.base_size();
        if out.len() < base {
            return Err(CodecError::too_small(base, out.len()));
        }

        let mut cursor = &mut out[..base];
        let file_header = FileHeader {
            magic: MAGIC_HEADER,
            file_size: self.file_size,
            header_size: self.header_size,
            info_size: self.version.info_size(),
        };
        bincode::serialize_into(&mut cursor, &file_header).map_err(fields_error)?;

        match self.version {
            FormatVersion::Legacy => bincode::serialize_into(
                &mut cursor,
                &LegacyInfo {
                    width: self.width,
                    height: self.height,
                    bit_depth: self.bit_depth,
                },
            ),
            FormatVersion::Revised => bincode::serialize_into(
                &mut cursor,
                &RevisedInfo {
                    width: self.width,
                    height: self.height,
                    bit_depth: self.bit_depth,
                    compression: self.compression as u16,
                },
            ),
        }
        .map_err(fields_error)?;

        debug!(
            "Header written: {:?} size={} offset={} {}x{}x{}",
            self.version, self.file_size, self.header_size, self.width, self.height, self.bit_depth
        );
        Ok(())
    }
}
