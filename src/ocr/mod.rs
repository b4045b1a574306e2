//! Text-recognition (OCR) module.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                RecognitionEngine (trait)                 │
//! │                                                         │
//! │  TesseractEngine ──create_worker──▶ TesseractWorker      │
//! │  UnavailableEngine (binary missing)     │                │
//! │                                         ▼                │
//! │               recognize(image, progress) → RawRecognition│
//! │                                         │                │
//! │                                    terminate()           │
//! └─────────────────────────────────────────────────────────┘
//!                          ▲
//!              RecognitionInvoker (clamp / trim / percent)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fieldscan::capture::ImagePayload;
//! use fieldscan::config::OcrConfig;
//! use fieldscan::ocr::{build_invoker};
//!
//! let invoker = build_invoker(&OcrConfig::default()).unwrap();
//! let image = ImagePayload::from_path("form.jpg".as_ref()).unwrap().unwrap();
//! let result = invoker.run_blocking(&image, &|pct| println!("{pct}%")).unwrap();
//! println!("{} ({}%)", result.text, result.confidence);
//! ```

pub mod engine;
pub mod invoker;
pub mod language;
#[cfg(test)]
pub mod simulated;
pub mod tesseract;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{OcrError, RawRecognition, RecognitionEngine, RecognitionWorker, UnavailableEngine};
pub use invoker::{
    clamp_confidence, fraction_to_percent, ProgressFn, RecognitionInvoker, RecognitionResult,
};
pub use language::LanguageSet;
pub use tesseract::{parse_tsv, TesseractEngine};

use std::sync::Arc;

use crate::config::{EngineChoice, OcrConfig};

/// Build the engine for `choice`, degrading to [`UnavailableEngine`] when the
/// tesseract binary cannot be run.
pub fn build_engine(config: &OcrConfig, choice: EngineChoice) -> Arc<dyn RecognitionEngine> {
    let engine = TesseractEngine::new(&config.tesseract_path, choice);
    match engine.detect_version() {
        Ok(version) => {
            log::info!("ocr: using {version} ({})", choice.label());
            Arc::new(engine)
        }
        Err(e) => {
            log::warn!("ocr: {e}. Recognition jobs will fail until tesseract is installed.");
            Arc::new(UnavailableEngine::new(e.to_string()))
        }
    }
}

/// Build an invoker from `config` using its configured engine choice.
///
/// # Errors
///
/// [`OcrError::NoLanguages`] when `config.languages` has no usable entry.
pub fn build_invoker(config: &OcrConfig) -> Result<RecognitionInvoker, OcrError> {
    let languages = LanguageSet::new(&config.languages)?;
    Ok(RecognitionInvoker::new(
        build_engine(config, config.engine),
        config.engine,
        languages,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_degrades_to_unavailable_engine() {
        let config = OcrConfig {
            tesseract_path: "/nonexistent/fieldscan-tesseract".into(),
            ..OcrConfig::default()
        };
        let invoker = build_invoker(&config).unwrap();
        assert_eq!(invoker.engine_choice(), EngineChoice::Tesseract);
        assert_eq!(invoker.languages().primary(), "eng");
    }

    #[test]
    fn blank_language_list_is_rejected() {
        let config = OcrConfig {
            languages: vec!["  ".into()],
            ..OcrConfig::default()
        };
        assert!(matches!(build_invoker(&config), Err(OcrError::NoLanguages)));
    }
}
