use log::{debug, error};

use crate::constants::ROW_ALIGNMENT;
use crate::error::CodecError;
use crate::image::format::Orientation;

/// Bytes holding the pixels of one row, before padding.
pub fn visible_row_bytes(width: u16, bit_depth: u16) -> usize {
    (width as usize * bit_depth as usize).div_ceil(8)
}

/// Bytes one row occupies in the file, padded to a multiple of 4.
pub fn row_stride(width: u16, bit_depth: u16) -> usize {
    visible_row_bytes(width, bit_depth).next_multiple_of(ROW_ALIGNMENT)
}

/// Row geometry of the pixel data stored in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub height: usize,
    /// Bytes carrying pixels.
    pub visible: usize,
    /// Bytes per row including padding.
    pub stride: usize,
}

impl RowLayout {
    pub fn new(width: u16, height: u16, bit_depth: u16) -> Self {
        Self {
            height: height as usize,
            visible: visible_row_bytes(width, bit_depth),
            stride: row_stride(width, bit_depth),
        }
    }

    pub fn padding(&self) -> usize {
        self.stride - self.visible
    }

    /// Size of the whole pixel data block in the file.
    pub fn image_size(&self) -> usize {
        self.height * self.stride
    }
}

/// Bytes a buffer of `height` rows needs when only the last row may be short.
///
/// `None` when the size overflows `usize`.
pub fn required_len(height: usize, stride: usize, row_bytes: usize) -> Option<usize> {
    match height {
        0 => Some(0),
        h => (h - 1).checked_mul(stride)?.checked_add(row_bytes),
    }
}

/// Checks that a buffer of `available` bytes holds `height` rows.
pub fn check_rows_fit(
    height: usize,
    stride: usize,
    row_bytes: usize,
    available: usize,
) -> Result<(), CodecError> {
    if stride < row_bytes {
        error!(
            "Stride {} shorter than a row of {} bytes",
            stride, row_bytes
        );
        return Err(CodecError::too_small(row_bytes, stride));
    }
    // An overflowing size can never fit
    let needed = required_len(height, stride, row_bytes).unwrap_or(usize::MAX);
    if available < needed {
        error!("Buffer too small for {} rows: {} < {}", height, available, needed);
        return Err(CodecError::too_small(needed, available));
    }
    Ok(())
}

/// Copies file rows into a top-down destination buffer.
///
/// The destination is zeroed first, so padding and any rows a future
/// compressed mode skips read back as zero.
pub fn decode_rows(
    src: &[u8],
    layout: &RowLayout,
    orientation: Orientation,
    dst: &mut [u8],
    dst_stride: usize,
) -> Result<(), CodecError> {
    if src.len() < layout.image_size() {
        error!(
            "Pixel data too short: {} < {}",
            src.len(),
            layout.image_size()
        );
        return Err(CodecError::too_small(layout.image_size(), src.len()));
    }
    check_rows_fit(layout.height, dst_stride, layout.visible, dst.len())?;

    let rows_end = dst.len().min(layout.height.saturating_mul(dst_stride));
    dst[..rows_end].fill(0);
    if layout.visible == 0 {
        return Ok(());
    }

    for (file_row, line) in src.chunks_exact(layout.stride).take(layout.height).enumerate() {
        let y = orientation.memory_row(file_row, layout.height);
        let start = y * dst_stride;
        dst[start..start + layout.visible].copy_from_slice(&line[..layout.visible]);
    }
    debug!(
        "Decoded {} rows of {} bytes ({:?})",
        layout.height, layout.visible, orientation
    );

    Ok(())
}

/// Writes source rows into the file layout, padding every row with zeros.
///
/// `convert` turns one source row (`src_row_bytes` long) into the
/// `layout.visible` bytes stored in the file.
pub fn encode_rows<F>(
    src: &[u8],
    src_stride: usize,
    src_row_bytes: usize,
    layout: &RowLayout,
    orientation: Orientation,
    out: &mut [u8],
    mut convert: F,
) -> Result<(), CodecError>
where
    F: FnMut(&[u8], &mut [u8]),
{
    check_rows_fit(layout.height, src_stride, src_row_bytes, src.len())?;
    if out.len() < layout.image_size() {
        error!(
            "Output too small for pixel data: {} < {}",
            out.len(),
            layout.image_size()
        );
        return Err(CodecError::too_small(layout.image_size(), out.len()));
    }
    if layout.visible == 0 {
        return Ok(());
    }

    for (file_row, line) in out
        .chunks_exact_mut(layout.stride)
        .take(layout.height)
        .enumerate()
    {
        let y = orientation.memory_row(file_row, layout.height);
        let start = y * src_stride;
        let (pixels, padding) = line.split_at_mut(layout.visible);
        convert(&src[start..start + src_row_bytes], pixels);
        padding.fill(0);
    }
    debug!(
        "Encoded {} rows, {} bytes + {} padding each ({:?})",
        layout.height,
        layout.visible,
        layout.padding(),
        orientation
    );

    Ok(())
}
