pub mod constants;
pub mod error;
pub mod image;
pub mod pixels;

use log::*;
use std::io::Write;

pub use crate::error::{CodecError, HeaderError};
pub use crate::image::format::{
    Compression, FormatVersion, Frame, FrameRef, Orientation, PackedFormat, PixelFormat,
    TrueColorTarget,
};
pub use crate::image::{
    decode, decode_into, decode_with, encode, encode_into, encoded_size, DecoderOptions,
    EncoderOptions, FrameInfo,
};
pub use crate::pixels::palette::Palette;

/// Routes the crate's log records to stderr at the given level.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter(Some("lib_xkcd"), level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();
}
