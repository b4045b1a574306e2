//! Scanner pipeline for fieldscan.
//!
//! Wires image sources (file, drag-and-drop, camera) to the recognition
//! invoker and records every attempt in the shared [`ResultLedger`].  The
//! UI reads the ledger each frame and drives the scanner with commands.
//!
//! # Architecture
//!
//! ```text
//! ScannerCommand (mpsc)
//!        │
//!        ▼
//! Scanner::run()  ← async tokio task
//!        │
//!        ├─ SubmitFile / SubmitDropped / CapturePhoto
//!        │     └─ submit → Queued job → tokio::spawn(recognise)
//!        ├─ Start/StopCamera        → CameraSession
//!        ├─ SelectEngine            → new RecognitionInvoker
//!        ├─ Retry / Download        → by JobId
//!        └─ RevokePreview           → PreviewRegistry
//!
//! SharedLedger (Arc<Mutex<ResultLedger>>) ←─── read by egui update() each frame
//! ScannerEvent (mpsc)                     ───→ drained by egui with try_recv
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use fieldscan::capture::{CameraSession, NoCamera};
//! use fieldscan::config::{AppConfig, EngineChoice};
//! use fieldscan::ledger::new_shared_ledger;
//! use fieldscan::ocr::{build_engine, LanguageSet};
//! use fieldscan::pipeline::{new_shared_previews, EngineFactory, Scanner, ScannerCommand};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let ocr = config.ocr.clone();
//!     let engines: EngineFactory = Arc::new(move |choice| build_engine(&ocr, choice));
//!
//!     let (event_tx, _event_rx) = mpsc::channel(64);
//!     let (command_tx, command_rx) = mpsc::channel(16);
//!     let scanner = Scanner::new(
//!         new_shared_ledger(),
//!         new_shared_previews(),
//!         engines,
//!         EngineChoice::Tesseract,
//!         LanguageSet::default(),
//!         CameraSession::new(Arc::new(NoCamera), 90),
//!         std::env::temp_dir(),
//!         event_tx,
//!     );
//!     tokio::spawn(scanner.run(command_rx));
//!
//!     command_tx
//!         .send(ScannerCommand::SubmitFile("form.png".into()))
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! [`ResultLedger`]: crate::ledger::ResultLedger

pub mod scanner;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use scanner::{
    new_shared_previews, EngineFactory, ScanError, Scanner, ScannerCommand, ScannerEvent,
    SharedPreviews, TextCallback, FAILURE_MESSAGE,
};
