use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use lissage_core::codec;
use lissage_core::denoise::denoise;
use lissage_core::pipeline::Pipeline;
use lissage_core::{ColorBaseline, DenoiseParams, EditParams, ImageBuf, ImageInfo, color_baseline};

use crate::command::{Command, EngineEvent, LoadedImage};
use crate::engine::Shared;
use crate::error::EngineError;

/// Image state owned by the worker thread.
#[derive(Default)]
struct WorkerState {
    original: Option<Arc<ImageBuf>>,
    current: Option<Arc<ImageBuf>>,
    baseline: ColorBaseline,
    info: Option<ImageInfo>,
}

pub(crate) fn worker_loop(
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<EngineEvent>,
    shared: Arc<Shared>,
) {
    let _running = RunningGuard(&shared);
    info!("engine worker started");
    let pipeline = Pipeline::new();
    let mut state = WorkerState::default();

    while let Some(command) = commands.blocking_recv() {
        if matches!(command, Command::Shutdown) {
            break;
        }
        // Handlers only touch `state` after their work succeeds, so a
        // panicking command leaves the previous image and result in place.
        run_contained(|| handle_command(command, &pipeline, &mut state, &events, &shared));
    }

    info!("engine worker stopped");
}

/// Clears the running flag however the worker loop ends.
struct RunningGuard<'a>(&'a Shared);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::SeqCst);
    }
}

/// Run one command, logging a panic instead of unwinding the worker.
/// Returns false if the command panicked.
fn run_contained(f: impl FnOnce()) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            error!(reason = panic_reason(payload.as_ref()), "command panicked");
            false
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown")
}

fn handle_command(
    command: Command,
    pipeline: &Pipeline,
    state: &mut WorkerState,
    events: &mpsc::UnboundedSender<EngineEvent>,
    shared: &Shared,
) {
    match command {
        Command::Load { path, reply } => {
            let result = handle_load(&path, state, shared);
            let _ = reply.send(result);
        }
        Command::Denoise(params) => handle_denoise(&params, state, events),
        Command::Edit(params) => handle_edit(&params, pipeline, state, events),
        Command::CurrentImage { reply } => {
            let _ = reply.send(Ok(state.current.clone()));
        }
        Command::Info { reply } => {
            let _ = reply.send(Ok(state.info.clone()));
        }
        Command::Save { path, image, reply } => {
            let result = handle_save(&path, image, state, shared.jpeg_quality);
            let _ = reply.send(result);
        }
        Command::Shutdown => {}
    }
}

/// Decode first and only then replace the state, so a failed load keeps the
/// previous image.
fn handle_load(
    path: &Path,
    state: &mut WorkerState,
    shared: &Shared,
) -> Result<LoadedImage, EngineError> {
    let image = codec::load_image(path).inspect_err(|e| warn!(?path, "load failed: {e}"))?;
    let baseline = color_baseline(&image);
    let info = ImageInfo::new(path, &image);
    info!(
        ?path,
        width = image.width,
        height = image.height,
        hue = baseline.hue,
        saturation = baseline.saturation,
        "image loaded"
    );

    state.original = Some(Arc::new(image));
    state.current = None;
    state.baseline = baseline;
    state.info = Some(info.clone());
    shared.has_image.store(true, Ordering::SeqCst);

    Ok(LoadedImage { info, baseline })
}

fn handle_denoise(
    params: &DenoiseParams,
    state: &mut WorkerState,
    events: &mpsc::UnboundedSender<EngineEvent>,
) {
    let Some(original) = state.original.clone() else {
        warn!("denoise requested with no image loaded");
        return;
    };
    match denoise(&original, params) {
        Ok(output) => {
            let output = Arc::new(output);
            state.current = Some(output.clone());
            publish(events, EngineEvent::Denoised(output));
        }
        Err(e) => warn!(filter = %params.process_type(), "denoise failed: {e:#}"),
    }
}

fn handle_edit(
    params: &EditParams,
    pipeline: &Pipeline,
    state: &mut WorkerState,
    events: &mpsc::UnboundedSender<EngineEvent>,
) {
    let Some(original) = state.original.clone() else {
        warn!("edit requested with no image loaded");
        return;
    };
    match pipeline.process_cpu(&original, params, state.baseline) {
        Ok(output) => {
            let output = Arc::new(output);
            state.current = Some(output.clone());
            publish(events, EngineEvent::Edited(output));
        }
        Err(e) => warn!("edit failed: {e:#}"),
    }
}

fn handle_save(
    path: &Path,
    image: Option<Arc<ImageBuf>>,
    state: &WorkerState,
    jpeg_quality: u8,
) -> Result<(), EngineError> {
    if state.original.is_none() {
        return Err(EngineError::NoImage);
    }
    let image = match image {
        Some(image) => image,
        None => state.current.clone().ok_or(EngineError::NoResult)?,
    };
    codec::save_image(path, &image, jpeg_quality)
        .inspect_err(|e| warn!(?path, "save failed: {e}"))?;
    Ok(())
}

fn publish(events: &mpsc::UnboundedSender<EngineEvent>, event: EngineEvent) {
    let kind = if event.is_denoised() { "denoised" } else { "edited" };
    debug!(kind, "publishing result");
    if events.send(event).is_err() {
        debug!(kind, "result dropped, no listener");
    }
}
