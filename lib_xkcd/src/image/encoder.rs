use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use super::format::{FormatVersion, FrameRef, PackedFormat, PixelFormat, TrueColorTarget};
use super::header::Header;
use crate::error::CodecError;
use crate::pixels::palette::Palette;
use crate::pixels::quantize::ChannelLevels;
use crate::pixels::rows::{check_rows_fit, encode_rows, RowLayout};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    pub version: FormatVersion,
    pub true_color: TrueColorTarget,
}

/// How a source row becomes a file row.
enum RowConversion {
    Copy,
    /// R, G, B in memory, B, G, R in the file.
    SwapRedBlue,
    /// Quantize true color into one byte per pixel.
    Pack {
        levels: ChannelLevels,
        source_is_bgr: bool,
    },
}

impl RowConversion {
    fn apply(&self, src: &[u8], dst: &mut [u8]) {
        match self {
            RowConversion::Copy => dst.copy_from_slice(src),
            RowConversion::SwapRedBlue => {
                for (out, pixel) in dst.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
                    out.copy_from_slice(&[pixel[2], pixel[1], pixel[0]]);
                }
            }
            RowConversion::Pack {
                levels,
                source_is_bgr,
            } => {
                for (out, pixel) in dst.iter_mut().zip(src.chunks_exact(3)) {
                    *out = if *source_is_bgr {
                        levels.pack(pixel[2], pixel[1], pixel[0])
                    } else {
                        levels.pack(pixel[0], pixel[1], pixel[2])
                    };
                }
            }
        }
    }
}

/// Everything needed to lay out one encoded file.
struct EncodePlan {
    header: Header,
    palette: Option<Palette>,
    /// Stored palette length, `2^depth` when there is a palette.
    entries: usize,
    layout: RowLayout,
    conversion: RowConversion,
}

impl EncodePlan {
    fn new(frame: &FrameRef<'_>, options: &EncoderOptions) -> Result<Self, CodecError> {
        // Nothing is written until the source is known to hold every row
        check_rows_fit(
            frame.height as usize,
            frame.stride,
            frame.row_bytes(),
            frame.data.len(),
        )?;

        let (bit_depth, palette, conversion) = match (frame.format, frame.format.packed()) {
            (_, Some(packed)) => (8, Some(Palette::systematic(packed)), RowConversion::Copy),
            (PixelFormat::Monoblack, _) => (1, Some(Palette::monoblack()), RowConversion::Copy),
            (PixelFormat::Pal8, _) => {
                let palette = frame
                    .palette
                    .filter(|palette| !palette.is_empty() && palette.fits_depth(8))
                    .ok_or_else(|| {
                        error!("Pal8 frame needs a palette of 1 to 256 colors");
                        CodecError::MissingPalette
                    })?;
                (8, Some(palette.clone()), RowConversion::Copy)
            }
            (PixelFormat::Gray8, _) => (8, Some(Palette::grayscale()), RowConversion::Copy),
            (format, _) => {
                debug_assert!(format.is_true_color());
                let source_is_bgr = format == PixelFormat::Bgr24;
                match options.true_color {
                    TrueColorTarget::Direct if source_is_bgr => (24, None, RowConversion::Copy),
                    TrueColorTarget::Direct => (24, None, RowConversion::SwapRedBlue),
                    TrueColorTarget::Packed(packed) => pack_plan(packed, source_is_bgr),
                }
            }
        };

        let entries = palette.as_ref().map_or(0, |_| 1usize << bit_depth);
        let header = Header::for_image(
            options.version,
            frame.width,
            frame.height,
            bit_depth,
            entries,
        )?;
        let layout = header.row_layout();
        debug!(
            "Encoding {:?} as depth {} with {} palette entries, stride {}",
            frame.format, bit_depth, entries, layout.stride
        );

        Ok(Self {
            header,
            palette,
            entries,
            layout,
            conversion,
        })
    }
}

fn pack_plan(packed: PackedFormat, source_is_bgr: bool) -> (u16, Option<Palette>, RowConversion) {
    (
        8,
        Some(Palette::systematic(packed)),
        RowConversion::Pack {
            levels: ChannelLevels::new(packed),
            source_is_bgr,
        },
    )
}

/// Number of bytes `encode` produces for this frame.
pub fn encoded_size(frame: &FrameRef<'_>, options: &EncoderOptions) -> Result<usize, CodecError> {
    Ok(EncodePlan::new(frame, options)?.header.file_size as usize)
}

pub fn encode(frame: &FrameRef<'_>, options: &EncoderOptions) -> Result<Vec<u8>, CodecError> {
    let plan = EncodePlan::new(frame, options)?;
    let mut encoded_data = vec![0u8; plan.header.file_size as usize];
    write_file(frame, &plan, &mut encoded_data)?;
    Ok(encoded_data)
}

/// Encodes into `out`, returning the number of bytes written.
pub fn encode_into(
    frame: &FrameRef<'_>,
    options: &EncoderOptions,
    out: &mut [u8],
) -> Result<usize, CodecError> {
    let plan = EncodePlan::new(frame, options)?;
    let size = plan.header.file_size as usize;
    if out.len() < size {
        error!("Output buffer too small: {} < {}", out.len(), size);
        return Err(CodecError::too_small(size, out.len()));
    }
    write_file(frame, &plan, &mut out[..size])?;
    Ok(size)
}

fn write_file(frame: &FrameRef<'_>, plan: &EncodePlan, out: &mut [u8]) -> Result<(), CodecError> {
    info!("Starting encoding");

    // Step 1: Write header
    plan.header.write(out)?;

    // Step 2: Palette, always 4 bytes per entry
    let header_size = plan.header.header_size as usize;
    if let Some(palette) = &plan.palette {
        palette.write(&mut out[plan.header.base_size()..header_size], plan.entries);
        debug!("Palette data written with {} colors", plan.entries);
    }

    // Step 3: Rows, padded to the file stride
    encode_rows(
        frame.data,
        frame.stride,
        frame.row_bytes(),
        &plan.layout,
        plan.header.version.orientation(),
        &mut out[header_size..],
        |src, dst| plan.conversion.apply(src, dst),
    )?;

    info!(
        "Encoding completed: {} bytes for {}x{}",
        out.len(),
        frame.width,
        frame.height
    );
    Ok(())
}
