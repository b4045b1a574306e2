//! Core recognition engine traits.
//!
//! # Overview
//!
//! [`RecognitionEngine`] is the interface the invoker is polymorphic over.
//! It is object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn RecognitionEngine>`.
//!
//! Engines do not recognise directly: each job asks for a fresh
//! [`RecognitionWorker`], runs exactly one recognition on it and then
//! terminates it.  Workers are never pooled or reused across jobs.

use thiserror::Error;

use crate::capture::ImagePayload;

use super::LanguageSet;

// ---------------------------------------------------------------------------
// OcrError
// ---------------------------------------------------------------------------

/// All errors that can arise from the recognition subsystem.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// The configured language list was empty.
    #[error("at least one recognition language is required")]
    NoLanguages,

    /// The back-end cannot run at all (binary missing, not configured …).
    #[error("recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Creating the per-job worker failed.
    #[error("failed to start recognition worker: {0}")]
    Worker(String),

    /// The engine ran but reported a failure.
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// The blocking task running the engine panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// RawRecognition
// ---------------------------------------------------------------------------

/// Unnormalised engine output.  `confidence` is nominally 0 – 100 but is not
/// trusted; the invoker clamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecognition {
    pub text: String,
    pub confidence: f32,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A single-use recognition worker.
pub trait RecognitionWorker: Send {
    /// Recognise `image`.  `progress` receives fractions in `[0, 1]` while
    /// the engine is working.
    fn recognize(
        &mut self,
        image: &ImagePayload,
        progress: &dyn Fn(f32),
    ) -> Result<RawRecognition, OcrError>;

    /// Release everything the worker holds.
    fn terminate(self: Box<Self>);
}

/// Object-safe, thread-safe recognition back-end.
pub trait RecognitionEngine: Send + Sync {
    /// Human-readable back-end name for logs and the UI.
    fn name(&self) -> &str;

    /// Create a fresh worker configured for `languages`.
    fn create_worker(
        &self,
        languages: &LanguageSet,
    ) -> Result<Box<dyn RecognitionWorker>, OcrError>;
}

// Compile-time assertion: Box<dyn RecognitionEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn RecognitionEngine>, _: Box<dyn RecognitionWorker>) {}
};

// ---------------------------------------------------------------------------
// UnavailableEngine
// ---------------------------------------------------------------------------

/// Stand-in engine used when the configured back-end cannot be started.
///
/// Every job fails with [`OcrError::EngineUnavailable`] so the app still
/// launches and the failure shows up per job.
#[derive(Debug, Clone)]
pub struct UnavailableEngine {
    reason: String,
}

impl UnavailableEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl RecognitionEngine for UnavailableEngine {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn create_worker(
        &self,
        _languages: &LanguageSet,
    ) -> Result<Box<dyn RecognitionWorker>, OcrError> {
        Err(OcrError::EngineUnavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_engine_refuses_workers() {
        let engine: Box<dyn RecognitionEngine> =
            Box::new(UnavailableEngine::new("tesseract not found"));
        let err = engine
            .create_worker(&LanguageSet::default())
            .err()
            .expect("must fail");
        assert!(err.to_string().contains("tesseract not found"));
    }
}
