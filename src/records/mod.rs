//! Session-local dashboard records and the filters over them.
//!
//! The records are fixed sample data; nothing here is persisted.  Every list
//! view filters with [`matches_query`]: a case-insensitive substring match
//! over a handful of text fields, combined with optional exact-match
//! dropdown filters.

pub mod agents;
pub mod documents;
pub mod regions;
pub mod validation;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use agents::{sample_agents, AgentFilter, AgentPerformance, AgentSummary, Badge, Trend};
pub use documents::{
    document_report, export_document, report_file_name, sample_documents, DocumentFilter,
    DocumentStats, DocumentStatus, OcrDocument, ReviewQueue,
};
pub use regions::{find_region, flatten_regions, sample_regions, RegionData, RegionLevel, RegionStatus};
pub use validation::{
    apply_bulk, error_categories, sample_errors, BulkAction, CategoryTrend, ErrorCategory,
    ErrorFilter, ErrorKind, ErrorSelection, ErrorStatus, Severity, ValidationError,
    ValidationStats,
};

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("no document with id {0}")]
    UnknownDocument(String),
}

/// `true` when `query` (trimmed, case-insensitive) occurs in any of
/// `fields`.  A blank query matches everything.
///
/// ```
/// use fieldscan::records::matches_query;
///
/// assert!(matches_query("surat", &["Priya Patel", "Surat"]));
/// assert!(matches_query("  ", &["anything"]));
/// assert!(!matches_query("pune", &["Rajesh Kumar", "Ahmadabad"]));
/// ```
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Fixture timestamp helper.
pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}
