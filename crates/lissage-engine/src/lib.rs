//! Background processing engine: owns the loaded image, runs denoise and
//! edit requests on a worker thread and publishes each finished image.

mod command;
pub mod config;
mod engine;
pub mod error;
mod worker;

pub use command::{EngineEvent, LoadedImage};
pub use config::EngineConfig;
pub use engine::{Engine, EngineEvents};
pub use error::EngineError;

pub use lissage_core::{DenoiseParams, EditParams, ImageBuf, ImageInfo, ProcessType};
