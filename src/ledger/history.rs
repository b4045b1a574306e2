//! The in-memory recognition history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::job::{JobId, JobPatch, JobStatus, RecognitionJob};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no job with id {0}")]
    UnknownJob(JobId),

    #[error("job {id} cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Newest-first history of recognition jobs.
///
/// Entries are only ever added at the front and are never removed for the
/// lifetime of the session.
#[derive(Debug, Default)]
pub struct ResultLedger {
    next_id: u64,
    jobs: VecDeque<RecognitionJob>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an id to `job` and insert it at the front.
    pub fn record(&mut self, mut job: RecognitionJob) -> JobId {
        self.next_id += 1;
        let id = JobId(self.next_id);
        job.id = id;
        log::debug!("ledger: recorded job {id} ({})", job.status.display_label());
        self.jobs.push_front(job);
        id
    }

    /// Apply `patch` to the job with `id` and nothing else.
    ///
    /// Progress updates on a terminal job, and progress values lower than
    /// the current one, are dropped silently.
    ///
    /// # Errors
    ///
    /// * [`LedgerError::UnknownJob`] when `id` was never recorded.
    /// * [`LedgerError::InvalidTransition`] for a status change the state
    ///   machine does not allow.
    pub fn update(&mut self, id: JobId, patch: JobPatch) -> Result<(), LedgerError> {
        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(LedgerError::UnknownJob(id))?;

        let next = match &patch {
            JobPatch::Progress(pct) => {
                if job.status.is_active() && *pct > job.progress {
                    job.progress = (*pct).min(100);
                }
                return Ok(());
            }
            JobPatch::Recognizing => JobStatus::Recognizing,
            JobPatch::Completed(_) => JobStatus::Completed,
            JobPatch::Failed(_) => JobStatus::Failed,
        };

        if !job.status.can_become(next) {
            return Err(LedgerError::InvalidTransition {
                id,
                from: job.status,
                to: next,
            });
        }

        log::debug!("ledger: job {id} {:?} → {next:?}", job.status);
        job.status = next;
        match patch {
            JobPatch::Completed(result) => {
                job.progress = 100;
                job.result = Some(result);
            }
            JobPatch::Failed(message) => job.error = Some(message),
            JobPatch::Recognizing | JobPatch::Progress(_) => {}
        }
        Ok(())
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &RecognitionJob> {
        self.jobs.iter()
    }

    /// Snapshot of one job.
    pub fn get(&self, id: JobId) -> Option<RecognitionJob> {
        self.jobs.iter().find(|j| j.id == id).cloned()
    }

    /// The job still in flight, if any.
    pub fn active(&self) -> Option<&RecognitionJob> {
        self.jobs.iter().find(|j| j.status.is_active())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Ledger shared between the scanner tasks and the UI.
///
/// Lock for short critical sections only; never across `.await`.
pub type SharedLedger = Arc<Mutex<ResultLedger>>;

pub fn new_shared_ledger() -> SharedLedger {
    Arc::new(Mutex::new(ResultLedger::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{ImagePayload, PreviewRegistry};
    use crate::config::EngineChoice;
    use crate::ocr::{LanguageSet, RecognitionResult};

    fn queued_job(reg: &mut PreviewRegistry) -> RecognitionJob {
        let url = reg.register(Arc::new(
            ImagePayload::new("sample.jpg", "image/jpeg", vec![1, 2]).unwrap(),
        ));
        RecognitionJob::queued(url, LanguageSet::default(), EngineChoice::Tesseract)
    }

    fn result(text: &str) -> RecognitionResult {
        RecognitionResult {
            text: text.into(),
            confidence: 88,
        }
    }

    #[test]
    fn record_inserts_newest_first_with_unique_ids() {
        let mut reg = PreviewRegistry::new();
        let mut ledger = ResultLedger::new();
        let a = ledger.record(queued_job(&mut reg));
        let b = ledger.record(queued_job(&mut reg));

        assert_ne!(a, b);
        let order: Vec<JobId> = ledger.iter().map(|j| j.id).collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn full_happy_path() {
        let mut reg = PreviewRegistry::new();
        let mut ledger = ResultLedger::new();
        let id = ledger.record(queued_job(&mut reg));

        ledger.update(id, JobPatch::Recognizing).unwrap();
        ledger.update(id, JobPatch::Progress(40)).unwrap();
        ledger.update(id, JobPatch::Completed(result("Name: Ram"))).unwrap();

        let job = ledger.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 100);
        assert_eq!(job.text(), Some("Name: Ram"));
        assert!(job.error.is_none());
        assert!(ledger.active().is_none());
    }

    #[test]
    fn updates_only_touch_the_addressed_job() {
        let mut reg = PreviewRegistry::new();
        let mut ledger = ResultLedger::new();
        let first = ledger.record(queued_job(&mut reg));
        let second = ledger.record(queued_job(&mut reg));

        ledger.update(first, JobPatch::Recognizing).unwrap();
        ledger.update(first, JobPatch::Progress(70)).unwrap();
        ledger.update(first, JobPatch::Failed("boom".into())).unwrap();

        let untouched = ledger.get(second).unwrap();
        assert_eq!(untouched.status, JobStatus::Queued);
        assert_eq!(untouched.progress, 0);
        assert!(untouched.error.is_none());
        assert_eq!(ledger.get(first).unwrap().status, JobStatus::Failed);
    }

    #[test]
    fn progress_never_regresses_or_outlives_the_job() {
        let mut reg = PreviewRegistry::new();
        let mut ledger = ResultLedger::new();
        let id = ledger.record(queued_job(&mut reg));

        ledger.update(id, JobPatch::Recognizing).unwrap();
        ledger.update(id, JobPatch::Progress(60)).unwrap();
        ledger.update(id, JobPatch::Progress(30)).unwrap();
        assert_eq!(ledger.get(id).unwrap().progress, 60);

        ledger.update(id, JobPatch::Failed("x".into())).unwrap();
        ledger.update(id, JobPatch::Progress(90)).unwrap();
        assert_eq!(ledger.get(id).unwrap().progress, 60);
    }

    #[test]
    fn terminal_jobs_reject_status_changes() {
        let mut reg = PreviewRegistry::new();
        let mut ledger = ResultLedger::new();
        let id = ledger.record(queued_job(&mut reg));
        ledger.update(id, JobPatch::Recognizing).unwrap();
        ledger.update(id, JobPatch::Completed(result("ok"))).unwrap();

        let err = ledger.update(id, JobPatch::Failed("late".into())).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransition { .. }));
        let job = ledger.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.error.is_none());
    }

    #[test]
    fn queued_can_fail_directly() {
        let mut reg = PreviewRegistry::new();
        let mut ledger = ResultLedger::new();
        let id = ledger.record(queued_job(&mut reg));
        ledger.update(id, JobPatch::Failed("no engine".into())).unwrap();
        assert!(ledger.get(id).unwrap().result.is_none());
    }

    #[test]
    fn unknown_id_is_reported() {
        let mut ledger = ResultLedger::new();
        assert_eq!(
            ledger.update(JobId(42), JobPatch::Recognizing),
            Err(LedgerError::UnknownJob(JobId(42)))
        );
    }

    #[test]
    fn active_finds_the_in_flight_job() {
        let mut reg = PreviewRegistry::new();
        let mut ledger = ResultLedger::new();
        let id = ledger.record(queued_job(&mut reg));
        assert_eq!(ledger.active().map(|j| j.id), Some(id));
    }
}
