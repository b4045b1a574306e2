//! Recognition invoker: one job, one worker, normalised output.
//!
//! The invoker maps engine progress fractions to whole percentages, trims
//! the recognised text and clamps the confidence into `0..=100`.  The worker
//! is terminated whether recognition succeeded or not.
//!
//! All engine work is synchronous and runs under
//! `tokio::task::spawn_blocking` so the async runtime never stalls.

use std::sync::Arc;

use crate::capture::ImagePayload;
use crate::config::EngineChoice;

use super::{LanguageSet, OcrError, RecognitionEngine};

/// Progress sink receiving whole percentages.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Normalised recognition output stored on a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    /// Recognised text, trimmed.  May be empty.
    pub text: String,
    /// Confidence score, 0 – 100.
    pub confidence: u8,
}

/// Runs recognition jobs against one engine configuration.
pub struct RecognitionInvoker {
    engine: Arc<dyn RecognitionEngine>,
    choice: EngineChoice,
    languages: LanguageSet,
}

impl RecognitionInvoker {
    pub fn new(
        engine: Arc<dyn RecognitionEngine>,
        choice: EngineChoice,
        languages: LanguageSet,
    ) -> Self {
        Self {
            engine,
            choice,
            languages,
        }
    }

    pub fn engine_choice(&self) -> EngineChoice {
        self.choice
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Recognise `image` on the current thread.
    pub fn run_blocking(
        &self,
        image: &ImagePayload,
        progress: &dyn Fn(u8),
    ) -> Result<RecognitionResult, OcrError> {
        let mut worker = self.engine.create_worker(&self.languages)?;

        let relay = |fraction: f32| progress(fraction_to_percent(fraction));
        let outcome = worker.recognize(image, &relay);
        worker.terminate();

        let raw = outcome?;
        Ok(RecognitionResult {
            text: raw.text.trim().to_string(),
            confidence: clamp_confidence(raw.confidence),
        })
    }

    /// Recognise `image` on the blocking thread pool.
    pub async fn invoke(
        self: Arc<Self>,
        image: Arc<ImagePayload>,
        progress: ProgressFn,
    ) -> Result<RecognitionResult, OcrError> {
        tokio::task::spawn_blocking(move || self.run_blocking(&image, &*progress))
            .await
            .map_err(|e| OcrError::Internal(e.to_string()))?
    }
}

/// `[0, 1]` fraction → whole percentage.  Out-of-range and NaN input is
/// clamped.
pub fn fraction_to_percent(fraction: f32) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Engine confidence → `0..=100`, rounded.
pub fn clamp_confidence(confidence: f32) -> u8 {
    if confidence.is_nan() {
        return 0;
    }
    confidence.round().clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
