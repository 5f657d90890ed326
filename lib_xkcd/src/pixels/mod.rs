pub mod palette;
pub mod quantize;
pub mod rows;
