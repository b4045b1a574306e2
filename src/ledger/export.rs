//! Plain-text export of completed recognition results.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::history::ResultLedger;
use super::job::{JobId, RecognitionJob};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no job with id {0}")]
    UnknownJob(JobId),

    #[error("job {0} has no recognised text to export")]
    NotCompleted(JobId),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Recognised text of the completed job `id`.
pub fn export_text(ledger: &ResultLedger, id: JobId) -> Result<String, ExportError> {
    let job = ledger.get(id).ok_or(ExportError::UnknownJob(id))?;
    job.text()
        .map(str::to_string)
        .ok_or(ExportError::NotCompleted(id))
}

/// `ocr-result-<created_at in ms>.txt`
pub fn export_file_name(job: &RecognitionJob) -> String {
    format!("ocr-result-{}.txt", job.created_at.timestamp_millis())
}

/// Write the text of job `id` into `dir`, creating it if needed.  The file
/// holds the text exactly, with no trailing newline added.
pub fn write_export(ledger: &ResultLedger, id: JobId, dir: &Path) -> Result<PathBuf, ExportError> {
    let text = export_text(ledger, id)?;
    let job = ledger.get(id).ok_or(ExportError::UnknownJob(id))?;
    let path = dir.join(export_file_name(&job));
    write_text_file(&path, &text)?;
    log::info!("ledger: exported job {id} to {}", path.display());
    Ok(path)
}

/// Create parent directories and write `contents` to `path`.
pub fn write_text_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, contents).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{ImagePayload, PreviewRegistry};
    use crate::config::EngineChoice;
    use crate::ledger::JobPatch;
    use crate::ocr::{LanguageSet, RecognitionResult};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn ledger_with_job() -> (ResultLedger, JobId) {
        let mut reg = PreviewRegistry::new();
        let url = reg.register(Arc::new(
            ImagePayload::new("sample.jpg", "image/jpeg", vec![1]).unwrap(),
        ));
        let mut ledger = ResultLedger::new();
        let id = ledger.record(RecognitionJob::queued(
            url,
            LanguageSet::default(),
            EngineChoice::Tesseract,
        ));
        (ledger, id)
    }

    #[test]
    fn only_completed_jobs_export() {
        let (mut ledger, id) = ledger_with_job();
        assert!(matches!(
            export_text(&ledger, id),
            Err(ExportError::NotCompleted(_))
        ));

        ledger.update(id, JobPatch::Recognizing).unwrap();
        ledger.update(id, JobPatch::Failed("x".into())).unwrap();
        assert!(matches!(
            export_text(&ledger, id),
            Err(ExportError::NotCompleted(_))
        ));
    }

    #[test]
    fn written_file_equals_text() {
        let (mut ledger, id) = ledger_with_job();
        let text = "नाम: राम\nAge: 45";
        ledger.update(id, JobPatch::Recognizing).unwrap();
        ledger
            .update(
                id,
                JobPatch::Completed(RecognitionResult {
                    text: text.into(),
                    confidence: 90,
                }),
            )
            .unwrap();

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("exports");
        let path = write_export(&ledger, id, &out).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("ocr-result-") && name.ends_with(".txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn unknown_job_is_an_error() {
        let ledger = ResultLedger::new();
        assert!(matches!(
            export_text(&ledger, JobId(7)),
            Err(ExportError::UnknownJob(_))
        ));
    }
}
