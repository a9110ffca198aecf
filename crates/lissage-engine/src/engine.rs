use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use lissage_core::{DenoiseParams, EditParams, ImageBuf, ImageInfo};

use crate::command::{Command, EngineEvent, LoadedImage};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::worker::worker_loop;

/// Flags shared between the handle and the worker thread.
pub(crate) struct Shared {
    pub(crate) running: AtomicBool,
    /// Set once the first load succeeds and never cleared.
    pub(crate) has_image: AtomicBool,
    pub(crate) jpeg_quality: u8,
}

/// Handle to the processing engine.
///
/// All image work happens on a dedicated worker thread, one command at a
/// time and in submission order. `denoise` and `edit` return as soon as the
/// request is queued; their results arrive on [`EngineEvents`]. The other
/// operations wait for the worker's answer.
///
/// The blocking calls must not be made from inside an async runtime.
pub struct Engine {
    commands: mpsc::UnboundedSender<Command>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

/// Receiving end for finished images.
pub struct EngineEvents {
    rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl EngineEvents {
    /// Wait for the next result. Returns `None` once the engine has stopped
    /// and every queued result has been taken.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for synchronous callers.
    pub fn blocking_recv(&mut self) -> Option<EngineEvent> {
        self.rx.blocking_recv()
    }

    /// Take a result if one is ready.
    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        self.rx.try_recv().ok()
    }
}

impl Engine {
    /// Validate `config` and spawn the worker thread.
    pub fn start(config: EngineConfig) -> Result<(Self, EngineEvents), EngineError> {
        config.validate()?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            running: AtomicBool::new(true),
            has_image: AtomicBool::new(false),
            jpeg_quality: config.jpeg_quality,
        });

        let worker_shared = shared.clone();
        let worker = std::thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || worker_loop(cmd_rx, event_tx, worker_shared))
            .map_err(EngineError::Spawn)?;
        info!(worker = %config.worker_name, "engine started");

        let engine = Self {
            commands: cmd_tx,
            shared,
            worker: Some(worker),
        };
        Ok((engine, EngineEvents { rx: event_rx }))
    }

    /// Finish queued work, then stop the worker and wait for it to exit.
    /// Calling this more than once is harmless.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.commands.send(Command::Shutdown);
        if worker.join().is_err() {
            warn!("engine worker panicked");
        }
        self.shared.running.store(false, Ordering::SeqCst);
        info!("engine stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// True once any image has been loaded successfully.
    pub fn has_image(&self) -> bool {
        self.shared.has_image.load(Ordering::SeqCst)
    }

    /// Decode `path` and make it the original image. Any previous result is
    /// discarded. On failure the engine keeps its previous state.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadedImage, EngineError> {
        let path = path.as_ref().to_path_buf();
        self.request(|reply| Command::Load { path, reply })
    }

    /// Queue a denoise of the original image. The result arrives as
    /// [`EngineEvent::Denoised`].
    pub fn denoise(&self, params: DenoiseParams) -> Result<(), EngineError> {
        params.validate()?;
        self.ensure_image()?;
        self.send(Command::Denoise(params))
    }

    /// Queue an edit of the original image. The result arrives as
    /// [`EngineEvent::Edited`].
    pub fn edit(&self, params: EditParams) -> Result<(), EngineError> {
        params.validate()?;
        self.ensure_image()?;
        self.send(Command::Edit(params))
    }

    /// Most recent result, after every previously queued command has run.
    pub fn current_image(&self) -> Result<Option<Arc<ImageBuf>>, EngineError> {
        self.request(|reply| Command::CurrentImage { reply })
    }

    /// Details of the loaded file.
    pub fn info(&self) -> Result<Option<ImageInfo>, EngineError> {
        self.request(|reply| Command::Info { reply })
    }

    /// Write the most recent result to `path`, in the format named by its
    /// extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let path = path.as_ref().to_path_buf();
        self.request(|reply| Command::Save {
            path,
            image: None,
            reply,
        })
    }

    /// Write `image` to `path`, in the format named by its extension. Like
    /// [`save`](Self::save), this needs an image to have been loaded.
    pub fn save_image(
        &self,
        path: impl AsRef<Path>,
        image: Arc<ImageBuf>,
    ) -> Result<(), EngineError> {
        let path = path.as_ref().to_path_buf();
        self.request(|reply| Command::Save {
            path,
            image: Some(image),
            reply,
        })
    }

    fn ensure_image(&self) -> Result<(), EngineError> {
        if self.has_image() {
            Ok(())
        } else {
            Err(EngineError::NoImage)
        }
    }

    fn send(&self, command: Command) -> Result<(), EngineError> {
        if self.worker.is_none() {
            return Err(EngineError::Stopped);
        }
        self.commands
            .send(command)
            .map_err(|_| EngineError::Stopped)
    }

    fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<T, EngineError>>) -> Command,
    ) -> Result<T, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.send(command(reply))?;
        rx.blocking_recv().map_err(|_| {
            if self.is_running() {
                EngineError::Interrupted
            } else {
                EngineError::Stopped
            }
        })?
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
