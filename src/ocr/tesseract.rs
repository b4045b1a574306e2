//! Tesseract back-end.
//!
//! Drives the `tesseract` command-line binary.  Each worker owns a private
//! staging directory; the image is written there, recognised with TSV output
//! and the directory is removed when the worker is terminated.
//!
//! ```text
//! tesseract <staging>/input.<ext> stdout -l eng+hin --oem <n> tsv
//! ```
//!
//! The TSV rows are turned back into text (words joined by spaces, lines by
//! `\n`, paragraphs and blocks by a blank line) and the word confidences are
//! averaged into a single score.

use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

use crate::capture::ImagePayload;
use crate::config::EngineChoice;

use super::{LanguageSet, OcrError, RawRecognition, RecognitionEngine, RecognitionWorker};

// ---------------------------------------------------------------------------
// TesseractEngine
// ---------------------------------------------------------------------------

/// Production engine wrapping the `tesseract` binary.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    choice: EngineChoice,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>, choice: EngineChoice) -> Self {
        Self {
            binary: binary.into(),
            choice,
        }
    }

    /// Check that the binary runs, returning its version banner.
    ///
    /// # Errors
    ///
    /// [`OcrError::EngineUnavailable`] when it cannot be executed.
    pub fn detect_version(&self) -> Result<String, OcrError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| {
                OcrError::EngineUnavailable(format!("{}: {e}", self.binary.display()))
            })?;

        if !output.status.success() {
            return Err(OcrError::EngineUnavailable(format!(
                "{} --version exited with {}",
                self.binary.display(),
                output.status
            )));
        }

        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or("tesseract")
            .trim()
            .to_string())
    }

    fn oem(&self) -> &'static str {
        match self.choice {
            EngineChoice::Tesseract => "3",
            EngineChoice::TesseractLstm => "1",
            EngineChoice::TesseractLegacy => "0",
        }
    }
}

impl RecognitionEngine for TesseractEngine {
    fn name(&self) -> &str {
        self.choice.label()
    }

    fn create_worker(
        &self,
        languages: &LanguageSet,
    ) -> Result<Box<dyn RecognitionWorker>, OcrError> {
        let staging = tempfile::Builder::new()
            .prefix("fieldscan-ocr-")
            .tempdir()
            .map_err(|e| OcrError::Worker(e.to_string()))?;

        Ok(Box::new(TesseractWorker {
            binary: self.binary.clone(),
            oem: self.oem(),
            languages: languages.tesseract_spec(),
            staging: Some(staging),
        }))
    }
}

// ---------------------------------------------------------------------------
// TesseractWorker
// ---------------------------------------------------------------------------

struct TesseractWorker {
    binary: PathBuf,
    oem: &'static str,
    languages: String,
    staging: Option<TempDir>,
}

impl RecognitionWorker for TesseractWorker {
    fn recognize(
        &mut self,
        image: &ImagePayload,
        progress: &dyn Fn(f32),
    ) -> Result<RawRecognition, OcrError> {
        let staging = self
            .staging
            .as_ref()
            .ok_or_else(|| OcrError::Worker("worker already terminated".into()))?;

        progress(0.0);
        let input = staging.path().join(format!("input.{}", image.extension()));
        std::fs::write(&input, image.bytes())
            .map_err(|e| OcrError::Worker(format!("staging {}: {e}", input.display())))?;
        progress(0.1);

        log::debug!(
            "ocr: tesseract -l {} --oem {} on {} ({} bytes)",
            self.languages,
            self.oem,
            image.name(),
            image.bytes().len()
        );

        let output = Command::new(&self.binary)
            .arg(&input)
            .arg("stdout")
            .args(["-l", self.languages.as_str(), "--oem", self.oem])
            .arg("tsv")
            .output()
            .map_err(|e| OcrError::Recognition(format!("{}: {e}", self.binary.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        progress(0.9);

        let recognition = parse_tsv(&String::from_utf8_lossy(&output.stdout))?;
        progress(1.0);
        Ok(recognition)
    }

    fn terminate(mut self: Box<Self>) {
        if let Some(staging) = self.staging.take() {
            if let Err(e) = staging.close() {
                log::warn!("ocr: failed to remove staging dir: {e}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TSV parsing
// ---------------------------------------------------------------------------

/// Column indices in tesseract's TSV output.
const COL_LEVEL: usize = 0;
const COL_PAGE: usize = 1;
const COL_BLOCK: usize = 2;
const COL_PAR: usize = 3;
const COL_LINE: usize = 4;
const COL_CONF: usize = 10;
const COL_TEXT: usize = 11;
const WORD_LEVEL: &str = "5";

/// Rebuild text and mean word confidence from tesseract TSV output.
///
/// # Errors
///
/// [`OcrError::Recognition`] when the header row is missing.
pub fn parse_tsv(tsv: &str) -> Result<RawRecognition, OcrError> {
    let mut rows = tsv.lines();
    match rows.next() {
        Some(header) if header.starts_with("level") => {}
        _ => return Err(OcrError::Recognition("unexpected tesseract TSV output".into())),
    }

    let mut text = String::new();
    let mut last: Option<[u32; 4]> = None;
    let mut conf_sum = 0.0f64;
    let mut conf_count = 0u32;

    for row in rows {
        let cols: Vec<&str> = row.splitn(COL_TEXT + 1, '\t').collect();
        if cols.len() <= COL_TEXT || cols[COL_LEVEL] != WORD_LEVEL {
            continue;
        }
        let word = cols[COL_TEXT].trim();
        if word.is_empty() {
            continue;
        }

        let num = |i: usize| cols[i].trim().parse::<u32>().unwrap_or(0);
        let key = [num(COL_PAGE), num(COL_BLOCK), num(COL_PAR), num(COL_LINE)];

        if let Some(prev) = last {
            if prev == key {
                text.push(' ');
            } else if prev[..3] == key[..3] {
                text.push('\n');
            } else {
                text.push_str("\n\n");
            }
        }
        text.push_str(word);
        last = Some(key);

        if let Ok(conf) = cols[COL_CONF].trim().parse::<f64>() {
            if conf >= 0.0 {
                conf_sum += conf;
                conf_count += 1;
            }
        }
    }

    let confidence = if conf_count == 0 {
        0.0
    } else {
        (conf_sum / f64::from(conf_count)) as f32
    };

    Ok(RawRecognition { text, confidence })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
