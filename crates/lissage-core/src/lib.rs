pub mod analysis;
pub mod codec;
pub mod color;
pub mod denoise;
pub mod image_buf;
pub mod params;
pub mod pipeline;

pub use analysis::{ColorBaseline, color_baseline};
pub use codec::{CodecError, ImageInfo};
pub use image_buf::ImageBuf;
pub use params::{DenoiseParams, EditParams, ProcessType, ValidationError};
