//! Result ledger: session history of recognition jobs.
//!
//! Every job gets a stable [`JobId`] when it is recorded, and every later
//! update addresses it by that id.  The scanner tasks write to the ledger
//! through [`SharedLedger`]; the UI reads it each frame.

pub mod export;
pub mod history;
pub mod job;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use export::{export_file_name, export_text, write_export, write_text_file, ExportError};
pub use history::{new_shared_ledger, LedgerError, ResultLedger, SharedLedger};
pub use job::{JobId, JobPatch, JobStatus, RecognitionJob};
