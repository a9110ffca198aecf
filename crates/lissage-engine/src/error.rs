use lissage_core::{CodecError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid parameters: {0}")]
    Validation(#[from] ValidationError),
    #[error("no image loaded")]
    NoImage,
    #[error("no processed image to save")]
    NoResult,
    #[error(transparent)]
    Io(#[from] CodecError),
    #[error("invalid engine configuration: {0}")]
    Config(String),
    #[error("failed to spawn engine worker")]
    Spawn(#[source] std::io::Error),
    #[error("engine is not running")]
    Stopped,
    #[error("request was dropped after a worker failure")]
    Interrupted,
}

impl EngineError {
    /// Errors caused by the caller's request rather than by the engine.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_) | EngineError::NoImage | EngineError::NoResult
        )
    }
}
