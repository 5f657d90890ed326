pub mod decoder;
pub mod encoder;
pub mod format;
pub mod header;

pub use decoder::{decode, decode_into, decode_with, DecoderOptions, FrameInfo};
pub use encoder::{encode, encode_into, encoded_size, EncoderOptions};
