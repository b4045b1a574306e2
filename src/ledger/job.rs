//! Recognition job record and its status machine.
//!
//! ```text
//! Queued ──▶ Recognizing ──▶ Completed
//!   │              │
//!   └──────────────┴──────▶ Failed
//! ```
//!
//! `Completed` and `Failed` are terminal.

use std::fmt;

use chrono::{DateTime, Local};

use crate::capture::PreviewUrl;
use crate::config::EngineChoice;
use crate::ocr::{LanguageSet, RecognitionResult};

/// Session-unique job identifier, assigned by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Recognizing,
    Completed,
    Failed,
}

impl JobStatus {
    /// `true` while the job is still in flight.
    ///
    /// ```
    /// use fieldscan::ledger::JobStatus;
    ///
    /// assert!(JobStatus::Queued.is_active());
    /// assert!(JobStatus::Recognizing.is_active());
    /// assert!(!JobStatus::Completed.is_active());
    /// assert!(!JobStatus::Failed.is_active());
    /// ```
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Recognizing)
    }

    /// Label shown in the history list.  Both in-flight states read as
    /// "processing".
    pub fn display_label(self) -> &'static str {
        match self {
            JobStatus::Queued | JobStatus::Recognizing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_become(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Recognizing)
                | (JobStatus::Queued, JobStatus::Failed)
                | (JobStatus::Recognizing, JobStatus::Completed)
                | (JobStatus::Recognizing, JobStatus::Failed)
        )
    }
}

/// One recognition attempt.
///
/// `result` is `Some` exactly when `status == Completed`; `error` exactly
/// when `status == Failed`.  Both are only written through
/// [`ResultLedger::update`](super::ResultLedger::update).
#[derive(Debug, Clone)]
pub struct RecognitionJob {
    pub id: JobId,
    pub created_at: DateTime<Local>,
    pub preview: PreviewUrl,
    pub languages: LanguageSet,
    pub engine: EngineChoice,
    pub progress: u8,
    pub status: JobStatus,
    pub result: Option<RecognitionResult>,
    pub error: Option<String>,
}

impl RecognitionJob {
    /// A fresh `Queued` job.  The id is a placeholder until the job is
    /// recorded.
    pub fn queued(preview: PreviewUrl, languages: LanguageSet, engine: EngineChoice) -> Self {
        Self {
            id: JobId(0),
            created_at: Local::now(),
            preview,
            languages,
            engine,
            progress: 0,
            status: JobStatus::Queued,
            result: None,
            error: None,
        }
    }

    /// Recognised text, only for completed jobs.
    pub fn text(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.text.as_str())
    }

    pub fn confidence(&self) -> Option<u8> {
        self.result.as_ref().map(|r| r.confidence)
    }
}

/// Mutation applied to a single job by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPatch {
    Recognizing,
    Progress(u8),
    Completed(RecognitionResult),
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_collapse_in_flight_states() {
        assert_eq!(JobStatus::Queued.display_label(), "processing");
        assert_eq!(JobStatus::Recognizing.display_label(), "processing");
        assert_eq!(JobStatus::Completed.display_label(), "completed");
        assert_eq!(JobStatus::Failed.display_label(), "failed");
    }

    #[test]
    fn terminal_states_never_move() {
        for from in [JobStatus::Completed, JobStatus::Failed] {
            for to in [
                JobStatus::Queued,
                JobStatus::Recognizing,
                JobStatus::Completed,
                JobStatus::Failed,
            ] {
                assert!(!from.can_become(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn queued_cannot_skip_to_completed() {
        assert!(!JobStatus::Queued.can_become(JobStatus::Completed));
        assert!(JobStatus::Queued.can_become(JobStatus::Failed));
        assert!(!JobStatus::Recognizing.can_become(JobStatus::Queued));
    }

    #[test]
    fn new_job_has_no_result() {
        let mut reg = crate::capture::PreviewRegistry::new();
        let url = reg.register(std::sync::Arc::new(
            crate::capture::ImagePayload::new("a.png", "image/png", vec![1]).unwrap(),
        ));
        let job = RecognitionJob::queued(url, LanguageSet::default(), EngineChoice::Tesseract);
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.text().is_none());
        assert!(job.confidence().is_none());
    }
}
