use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;

use lissage_core::{ColorBaseline, DenoiseParams, EditParams, ImageBuf, ImageInfo};

use crate::error::EngineError;

pub(crate) type Reply<T> = oneshot::Sender<Result<T, EngineError>>;

/// Work queued for the engine's worker thread.
pub(crate) enum Command {
    Load {
        path: PathBuf,
        reply: Reply<LoadedImage>,
    },
    Denoise(DenoiseParams),
    Edit(EditParams),
    CurrentImage {
        reply: Reply<Option<Arc<ImageBuf>>>,
    },
    Info {
        reply: Reply<Option<ImageInfo>>,
    },
    Save {
        path: PathBuf,
        /// Image to write; `None` writes the current result.
        image: Option<Arc<ImageBuf>>,
        reply: Reply<()>,
    },
    Shutdown,
}

/// Result of a successful load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedImage {
    pub info: ImageInfo,
    pub baseline: ColorBaseline,
}

impl LoadedImage {
    /// Edit values that reproduce the loaded image.
    pub fn edit_defaults(&self) -> EditParams {
        EditParams::identity(self.baseline)
    }
}

/// A finished image, tagged with the pipeline that produced it.
#[derive(Clone, Debug)]
pub enum EngineEvent {
    Denoised(Arc<ImageBuf>),
    Edited(Arc<ImageBuf>),
}

impl EngineEvent {
    pub fn image(&self) -> &Arc<ImageBuf> {
        match self {
            EngineEvent::Denoised(image) | EngineEvent::Edited(image) => image,
        }
    }

    pub fn is_denoised(&self) -> bool {
        matches!(self, EngineEvent::Denoised(_))
    }
}
