//! Scanner orchestrator: image sources → recognition → ledger.
//!
//! [`Scanner`] owns the camera session, the preview registry handle and the
//! active [`RecognitionInvoker`].  It reacts to [`ScannerCommand`]s received
//! over a `tokio::sync::mpsc` channel and reports back with
//! [`ScannerEvent`]s.
//!
//! # Job flow
//!
//! ```text
//! submit(payload)
//!   ├─ ledger busy?            → ScanError::Busy
//!   ├─ register preview, record Queued job (synchronously)  → JobId
//!   └─ tokio::spawn
//!        ├─ Recognizing
//!        ├─ spawn_blocking(invoker.run_blocking)  ── Progress(pct) by id
//!        ├─ Ok  → Completed(result), text callback
//!        └─ Err → Failed(FAILURE_MESSAGE)
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc;

use crate::capture::{
    CameraError, CameraSession, CaptureError, ImagePayload, PreviewRegistry, PreviewUrl,
};
use crate::config::EngineChoice;
use crate::ledger::{
    write_export, ExportError, JobId, JobPatch, JobStatus, RecognitionJob, SharedLedger,
};
use crate::ocr::{LanguageSet, ProgressFn, RecognitionEngine, RecognitionInvoker};

/// Message stored on every failed job.
pub const FAILURE_MESSAGE: &str =
    "Failed to process the image. Please try again with a clearer image or a different engine.";

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Preview registry shared with the UI (the detail view resolves URLs).
pub type SharedPreviews = Arc<Mutex<PreviewRegistry>>;

pub fn new_shared_previews() -> SharedPreviews {
    Arc::new(Mutex::new(PreviewRegistry::new()))
}

/// Builds the engine for a given choice.  Called on startup and whenever the
/// user picks another engine.
pub type EngineFactory = Arc<dyn Fn(EngineChoice) -> Arc<dyn RecognitionEngine> + Send + Sync>;

/// Receives `(text, confidence)` for every completed job.
pub type TextCallback = Arc<dyn Fn(&str, u8) + Send + Sync>;

// ---------------------------------------------------------------------------
// Commands / events / errors
// ---------------------------------------------------------------------------

/// Requests sent from the UI to the scanner task.
#[derive(Debug, Clone)]
pub enum ScannerCommand {
    SubmitFile(PathBuf),
    SubmitDropped {
        name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
    StartCamera,
    CapturePhoto,
    StopCamera,
    SelectEngine(EngineChoice),
    /// Resubmit the image of a finished job with the current engine.
    Retry(JobId),
    RevokePreview(PreviewUrl),
    /// Export the text of a completed job to the export directory.
    Download(JobId),
}

/// Notifications sent from the scanner task to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ScannerEvent {
    JobQueued(JobId),
    JobFinished { id: JobId, status: JobStatus },
    CameraStarted,
    CameraStopped,
    EngineSelected(EngineChoice),
    Exported { id: JobId, path: PathBuf },
    Error(String),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("job {0} is still processing")]
    Busy(JobId),

    #[error("no job with id {0}")]
    UnknownJob(JobId),

    #[error("job {0} has not finished yet")]
    NotFinished(JobId),

    #[error("the image for job {0} is no longer available")]
    PreviewGone(JobId),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Drives the capture/recognition pipeline.
///
/// Create with [`Scanner::new`], then spawn [`run`](Self::run) as a tokio
/// task.
pub struct Scanner {
    ledger: SharedLedger,
    previews: SharedPreviews,
    engines: EngineFactory,
    invoker: Arc<RecognitionInvoker>,
    camera: CameraSession,
    export_dir: PathBuf,
    on_text: Option<TextCallback>,
    events: mpsc::Sender<ScannerEvent>,
}

impl Scanner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: SharedLedger,
        previews: SharedPreviews,
        engines: EngineFactory,
        choice: EngineChoice,
        languages: LanguageSet,
        camera: CameraSession,
        export_dir: PathBuf,
        events: mpsc::Sender<ScannerEvent>,
    ) -> Self {
        let invoker = Arc::new(RecognitionInvoker::new(engines(choice), choice, languages));
        Self {
            ledger,
            previews,
            engines,
            invoker,
            camera,
            export_dir,
            on_text: None,
            events,
        }
    }

    /// Register a callback for completed recognitions.
    pub fn with_text_callback(mut self, callback: TextCallback) -> Self {
        self.on_text = Some(callback);
        self
    }

    pub fn engine_choice(&self) -> EngineChoice {
        self.invoker.engine_choice()
    }

    pub fn camera_active(&self) -> bool {
        self.camera.is_active()
    }

    pub fn camera_tracks(&self) -> usize {
        self.camera.active_tracks()
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `commands` is closed.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ScannerCommand>) {
        while let Some(command) = commands.recv().await {
            if let Err(e) = self.handle(command).await {
                log::warn!("scanner: {e}");
                self.emit(ScannerEvent::Error(e.to_string()));
            }
        }

        self.camera.stop();
        log::info!("scanner: command channel closed, shutting down");
    }

    async fn handle(&mut self, command: ScannerCommand) -> Result<(), ScanError> {
        match command {
            ScannerCommand::SubmitFile(path) => {
                self.submit_file(&path)?;
            }
            ScannerCommand::SubmitDropped { name, mime, bytes } => {
                match ImagePayload::from_dropped(&name, mime.as_deref(), bytes) {
                    Some(payload) => {
                        self.submit(payload)?;
                    }
                    None => log::debug!("scanner: ignoring non-image drop {name:?}"),
                }
            }
            ScannerCommand::StartCamera => self.start_camera()?,
            ScannerCommand::CapturePhoto => {
                self.capture_photo()?;
            }
            ScannerCommand::StopCamera => self.stop_camera(),
            ScannerCommand::SelectEngine(choice) => self.select_engine(choice).await,
            ScannerCommand::Retry(id) => {
                self.retry(id)?;
            }
            ScannerCommand::RevokePreview(url) => {
                if !self.previews.lock().unwrap().revoke(&url) {
                    log::debug!("scanner: preview {url} already revoked");
                }
            }
            ScannerCommand::Download(id) => {
                let path = self.download(id)?;
                self.emit(ScannerEvent::Exported { id, path });
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Read `path` and submit it.  Non-image files are ignored and return
    /// `Ok(None)`.
    pub fn submit_file(&mut self, path: &Path) -> Result<Option<JobId>, ScanError> {
        match ImagePayload::from_path(path)? {
            Some(payload) => self.submit(payload).map(Some),
            None => {
                log::debug!("scanner: ignoring non-image file {}", path.display());
                Ok(None)
            }
        }
    }

    /// Record a `Queued` job for `payload` and start recognising it.
    ///
    /// The job is in the ledger before this returns; recognition runs on a
    /// spawned task.  Must be called from within a tokio runtime.
    pub fn submit(&mut self, payload: ImagePayload) -> Result<JobId, ScanError> {
        let payload = Arc::new(payload);

        let id = {
            let mut ledger = self.ledger.lock().unwrap();
            if let Some(active) = ledger.active() {
                return Err(ScanError::Busy(active.id));
            }
            let preview = self.previews.lock().unwrap().register(Arc::clone(&payload));
            ledger.record(RecognitionJob::queued(
                preview,
                self.invoker.languages().clone(),
                self.invoker.engine_choice(),
            ))
        };

        log::debug!(
            "scanner: job {id} queued for {} ({} bytes, {})",
            payload.name(),
            payload.bytes().len(),
            self.invoker.engine_name()
        );
        self.emit(ScannerEvent::JobQueued(id));

        tokio::spawn(run_job(
            Arc::clone(&self.ledger),
            Arc::clone(&self.invoker),
            id,
            payload,
            self.on_text.clone(),
            self.events.clone(),
        ));

        Ok(id)
    }

    /// Resubmit the original image of the finished job `id`.
    pub fn retry(&mut self, id: JobId) -> Result<JobId, ScanError> {
        let job = self
            .ledger
            .lock()
            .unwrap()
            .get(id)
            .ok_or(ScanError::UnknownJob(id))?;
        if job.status.is_active() {
            return Err(ScanError::NotFinished(id));
        }
        let payload = self
            .previews
            .lock()
            .unwrap()
            .resolve(&job.preview)
            .ok_or(ScanError::PreviewGone(id))?;

        log::debug!("scanner: retrying job {id} with {}", self.invoker.engine_name());
        self.submit(ImagePayload::clone(&payload))
    }

    // -----------------------------------------------------------------------
    // Camera
    // -----------------------------------------------------------------------

    fn start_camera(&mut self) -> Result<(), ScanError> {
        self.camera.start()?;
        self.emit(ScannerEvent::CameraStarted);
        Ok(())
    }

    /// Capture the current camera frame and submit it.  The camera stays on.
    pub fn capture_photo(&mut self) -> Result<JobId, ScanError> {
        let payload = self.camera.capture()?;
        self.submit(payload)
    }

    fn stop_camera(&mut self) {
        self.camera.stop();
        self.emit(ScannerEvent::CameraStopped);
    }

    // -----------------------------------------------------------------------
    // Engine / export
    // -----------------------------------------------------------------------

    /// Switch engines.  A job already running keeps its own invoker.
    ///
    /// The factory may spawn processes, so it runs on the blocking pool.
    pub async fn select_engine(&mut self, choice: EngineChoice) {
        if choice == self.invoker.engine_choice() {
            return;
        }
        let factory = Arc::clone(&self.engines);
        let engine = match tokio::task::spawn_blocking(move || factory(choice)).await {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("scanner: building {} failed: {e}", choice.label());
                self.emit(ScannerEvent::Error(format!("could not switch to {}", choice.label())));
                return;
            }
        };
        let languages = self.invoker.languages().clone();
        self.invoker = Arc::new(RecognitionInvoker::new(engine, choice, languages));
        log::info!("scanner: engine set to {}", choice.label());
        self.emit(ScannerEvent::EngineSelected(choice));
    }

    pub fn download(&self, id: JobId) -> Result<PathBuf, ScanError> {
        let ledger = self.ledger.lock().unwrap();
        Ok(write_export(&ledger, id, &self.export_dir)?)
    }

    fn emit(&self, event: ScannerEvent) {
        send_event(&self.events, event);
    }
}

// ---------------------------------------------------------------------------
// Job task
// ---------------------------------------------------------------------------

async fn run_job(
    ledger: SharedLedger,
    invoker: Arc<RecognitionInvoker>,
    id: JobId,
    payload: Arc<ImagePayload>,
    on_text: Option<TextCallback>,
    events: mpsc::Sender<ScannerEvent>,
) {
    apply(&ledger, id, JobPatch::Recognizing);

    let progress: ProgressFn = {
        let ledger = Arc::clone(&ledger);
        Arc::new(move |pct| apply(&ledger, id, JobPatch::Progress(pct)))
    };

    let status = match invoker.invoke(payload, progress).await {
        Ok(result) => {
            log::debug!(
                "scanner: job {id} completed ({} chars, {}%)",
                result.text.chars().count(),
                result.confidence
            );
            // The ledger is settled before user code runs.
            let (text, confidence) = (result.text.clone(), result.confidence);
            apply(&ledger, id, JobPatch::Completed(result));
            if let Some(callback) = &on_text {
                callback(&text, confidence);
            }
            JobStatus::Completed
        }
        Err(e) => {
            log::error!("scanner: job {id} failed: {e}");
            apply(&ledger, id, JobPatch::Failed(FAILURE_MESSAGE.to_string()));
            JobStatus::Failed
        }
    };

    send_event(&events, ScannerEvent::JobFinished { id, status });
}

fn apply(ledger: &SharedLedger, id: JobId, patch: JobPatch) {
    if let Err(e) = ledger.lock().unwrap().update(id, patch) {
        log::warn!("scanner: {e}");
    }
}

fn send_event(events: &mpsc::Sender<ScannerEvent>, event: ScannerEvent) {
    if let Err(e) = events.try_send(event) {
        log::debug!("scanner: event dropped: {e}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
