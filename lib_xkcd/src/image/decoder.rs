use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use super::format::{Frame, FormatVersion, PixelFormat};
use super::header::Header;
use crate::error::CodecError;
use crate::pixels::palette::Palette;
use crate::pixels::rows::{decode_rows, RowLayout};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderOptions {
    /// Reject files whose declared size exceeds the input instead of
    /// clamping it.
    pub strict_file_size: bool,
}

/// What `decode_into` found in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub version: FormatVersion,
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
    pub palette: Option<Palette>,
}

pub fn decode(encoded_data: &[u8]) -> Result<Frame, CodecError> {
    decode_with(encoded_data, &DecoderOptions::default())
}

pub fn decode_with(encoded_data: &[u8], options: &DecoderOptions) -> Result<Frame, CodecError> {
    info!("Starting decoding");

    let header = Header::parse(encoded_data, options.strict_file_size)?;
    let layout = header.row_layout();
    let palette = read_palette(encoded_data, &header)?;
    let pixels = pixel_data(encoded_data, &header, &layout)?;

    // Allocate the destination, surfacing failure instead of aborting
    let size = layout.image_size();
    let mut data = Vec::new();
    data.try_reserve_exact(size).map_err(|e| {
        error!("Failed to allocate {} bytes for the frame", size);
        e
    })?;
    data.resize(size, 0);

    decode_rows(
        pixels,
        &layout,
        header.version.orientation(),
        &mut data,
        layout.stride,
    )?;

    info!(
        "Decoding completed: {}x{} {:?}",
        header.width, header.height, header.pixel_format
    );
    Ok(Frame {
        width: header.width,
        height: header.height,
        format: header.pixel_format,
        stride: layout.stride,
        data,
        palette,
    })
}

/// Decodes into a caller-owned buffer whose rows are `dst_stride` apart.
pub fn decode_into(
    encoded_data: &[u8],
    options: &DecoderOptions,
    dst: &mut [u8],
    dst_stride: usize,
) -> Result<FrameInfo, CodecError> {
    info!("Starting decoding into caller buffer");

    let header = Header::parse(encoded_data, options.strict_file_size)?;
    let layout = header.row_layout();
    let palette = read_palette(encoded_data, &header)?;

    decode_rows(
        pixel_data(encoded_data, &header, &layout)?,
        &layout,
        header.version.orientation(),
        dst,
        dst_stride,
    )?;

    info!("Decoding completed");
    Ok(FrameInfo {
        version: header.version,
        width: header.width,
        height: header.height,
        format: header.pixel_format,
        palette,
    })
}

fn read_palette(encoded_data: &[u8], header: &Header) -> Result<Option<Palette>, CodecError> {
    let Some(entries) = header.palette_entries() else {
        return Ok(None);
    };
    // Parsing guarantees base <= header_size < file_size <= input length
    let space = &encoded_data[header.base_size()..header.header_size as usize];
    let palette = Palette::read(space, entries)?;
    debug!("Palette read with {} colors", palette.len());
    Ok(Some(palette))
}

/// Pixel rows between the header and the (clamped) end of file.
fn pixel_data<'a>(
    encoded_data: &'a [u8],
    header: &Header,
    layout: &RowLayout,
) -> Result<&'a [u8], CodecError> {
    let data = &encoded_data[header.header_size as usize..header.file_size as usize];
    debug!("Pixel data length: {}", data.len());
    if data.len() < layout.image_size() {
        error!(
            "Image needs {} bytes of pixel data, file has {}",
            layout.image_size(),
            data.len()
        );
        return Err(CodecError::too_small(layout.image_size(), data.len()));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeaderError;

    /// Legacy 8-bit file with a 3-byte palette of `entries` colors.
    fn legacy_pal8(width: u16, height: u16, packed_entries: usize, rows: &[u8]) -> Vec<u8> {
        let header_size = 20 + packed_entries * 3;
        let file_size = header_size + rows.len();
        let mut data = b"XKCD".to_vec();
        data.extend_from_slice(&(file_size as u32).to_le_bytes());
        data.extend_from_slice(&(header_size as u32).to_le_bytes());
        data.extend_from_slice(&6u16.to_le_bytes());
        data.extend_from_slice(&width.to_le_bytes());
        data.extend_from_slice(&height.to_le_bytes());
        data.extend_from_slice(&8u16.to_le_bytes());
        for i in 0..packed_entries {
            data.extend_from_slice(&[i as u8, 0, 0]);
        }
        data.extend_from_slice(rows);
        data
    }

    #[test]
    fn test_decode_packed_palette_bottom_up() {
        let rows = [3, 4, 0, 0, 1, 2, 0, 0];
        let encoded = legacy_pal8(2, 2, 256, &rows);
        let frame = decode(&encoded).unwrap();

        assert_eq!(frame.format, PixelFormat::Pal8);
        assert_eq!(frame.stride, 4);
        assert_eq!(frame.row(0), &[1, 2]);
        assert_eq!(frame.row(1), &[3, 4]);

        let palette = frame.palette.unwrap();
        assert_eq!(palette.len(), 256);
        assert_eq!(palette.get(7), Some([0, 0, 7, 0xFF]));
    }

    #[test]
    fn test_decode_palette_does_not_fit() {
        let encoded = legacy_pal8(2, 2, 255, &[0; 8]);
        let result = decode(&encoded);
        assert!(matches!(
            result,
            Err(CodecError::MalformedHeader(HeaderError::PaletteDoesNotFit {
                entries: 256,
                available: 765
            }))
        ));
    }

    #[test]
    fn test_decode_into_caller_buffer() {
        let rows = [3, 4, 0, 0, 1, 2, 0, 0];
        let encoded = legacy_pal8(2, 2, 256, &rows);
        let mut dst = [0xAA; 6];
        let info = decode_into(&encoded, &DecoderOptions::default(), &mut dst, 3).unwrap();
        assert_eq!(info.version, FormatVersion::Legacy);
        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(dst, [1, 2, 0, 3, 4, 0]);
    }

    #[test]
    fn test_decode_into_small_buffer() {
        let encoded = legacy_pal8(2, 2, 256, &[0; 8]);
        let mut dst = [0u8; 3];
        let result = decode_into(&encoded, &DecoderOptions::default(), &mut dst, 2);
        assert!(matches!(
            result,
            Err(CodecError::BufferTooSmall {
                needed: 4,
                available: 3
            })
        ));
    }

    #[test]
    fn test_decode_truncated_pixel_data() {
        let mut encoded = legacy_pal8(2, 2, 256, &[0; 8]);
        encoded.truncate(encoded.len() - 1);
        let result = decode(&encoded);
        assert!(matches!(result, Err(CodecError::BufferTooSmall { .. })));
    }

    #[test]
    fn test_options_bincode_round_trip() {
        let options = DecoderOptions {
            strict_file_size: true,
        };
        let bytes = bincode::serialize(&options).unwrap();
        let restored: DecoderOptions = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, options);
    }
}
