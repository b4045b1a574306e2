//! OCR documents uploaded by agents, and their review queue.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::ledger::{write_text_file, ExportError};

use super::{at, matches_query, RecordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Pending,
    Reviewed,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        DocumentStatus::Pending,
        DocumentStatus::Reviewed,
        DocumentStatus::Approved,
        DocumentStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Reviewed => "reviewed",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrDocument {
    pub id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub district: String,
    pub state: String,
    pub document_type: String,
    pub extracted_text: String,
    pub confidence: u8,
    pub timestamp: NaiveDateTime,
    pub status: DocumentStatus,
    pub survey_id: Option<String>,
    pub notes: Option<String>,
}

impl OcrDocument {
    fn searchable(&self) -> [&str; 3] {
        [
            self.extracted_text.as_str(),
            self.agent_name.as_str(),
            self.district.as_str(),
        ]
    }
}

/// Documents shown in the review console.
pub fn sample_documents() -> Vec<OcrDocument> {
    vec![
        OcrDocument {
            id: "OCR001".into(),
            agent_id: "AG001".into(),
            agent_name: "Rajesh Kumar".into(),
            district: "Ahmadabad".into(),
            state: "Gujarat".into(),
            document_type: "Survey Form".into(),
            extracted_text: "Name: राम प्रसाद शर्मा\nAge: 45\nOccupation: किसान\nIncome: ₹25,000 per month\nEducation: 12th Pass\nFamily Size: 5 members".into(),
            confidence: 94,
            timestamp: at(2024, 1, 15, 10, 30),
            status: DocumentStatus::Pending,
            survey_id: Some("SUR001".into()),
            notes: None,
        },
        OcrDocument {
            id: "OCR002".into(),
            agent_id: "AG002".into(),
            agent_name: "Priya Patel".into(),
            district: "Surat".into(),
            state: "Gujarat".into(),
            document_type: "Identity Verification".into(),
            extracted_text: "Aadhaar Number: XXXX XXXX 1234\nName: PRIYA PATEL\nDOB: 15/08/1985\nAddress: 123 Gandhi Road, Surat, Gujarat".into(),
            confidence: 98,
            timestamp: at(2024, 1, 15, 9, 15),
            status: DocumentStatus::Approved,
            survey_id: Some("SUR002".into()),
            notes: None,
        },
        OcrDocument {
            id: "OCR003".into(),
            agent_id: "AG003".into(),
            agent_name: "Mohammed Ali".into(),
            district: "Hyderabad".into(),
            state: "Telangana".into(),
            document_type: "Income Certificate".into(),
            extracted_text: "Certificate No: INC/2024/001\nName: Mohammed Ali Khan\nAnnual Income: ₹3,50,000\nIssued by: Tehsildar Office\nDate: 10/01/2024".into(),
            confidence: 91,
            timestamp: at(2024, 1, 14, 16, 45),
            status: DocumentStatus::Reviewed,
            survey_id: Some("SUR003".into()),
            notes: None,
        },
    ]
}

// ---------------------------------------------------------------------------
// Filtering / stats
// ---------------------------------------------------------------------------

/// Search box plus the status and district dropdowns.  `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub query: String,
    pub status: Option<DocumentStatus>,
    pub district: Option<String>,
}

impl DocumentFilter {
    pub fn matches(&self, doc: &OcrDocument) -> bool {
        matches_query(&self.query, &doc.searchable())
            && self.status.map_or(true, |s| doc.status == s)
            && self.district.as_deref().map_or(true, |d| doc.district == d)
    }

    pub fn apply<'a>(&self, docs: &'a [OcrDocument]) -> Vec<&'a OcrDocument> {
        docs.iter().filter(|d| self.matches(d)).collect()
    }
}

/// Header cards of the review console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    /// Rounded mean confidence; 0 for an empty list.
    pub average_confidence: u8,
}

impl DocumentStats {
    pub fn from_documents(docs: &[OcrDocument]) -> Self {
        let count = |status: DocumentStatus| docs.iter().filter(|d| d.status == status).count();
        let average_confidence = if docs.is_empty() {
            0
        } else {
            let sum: u32 = docs.iter().map(|d| u32::from(d.confidence)).sum();
            (f64::from(sum) / docs.len() as f64).round() as u8
        };
        Self {
            total: docs.len(),
            pending: count(DocumentStatus::Pending),
            approved: count(DocumentStatus::Approved),
            average_confidence,
        }
    }
}

// ---------------------------------------------------------------------------
// ReviewQueue
// ---------------------------------------------------------------------------

/// Documents under review, mutated in memory only.
#[derive(Debug, Clone)]
pub struct ReviewQueue {
    documents: Vec<OcrDocument>,
}

impl ReviewQueue {
    pub fn new(documents: Vec<OcrDocument>) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &[OcrDocument] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&OcrDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn set_status(&mut self, id: &str, status: DocumentStatus) -> Result<(), RecordError> {
        let doc = self.get_mut(id)?;
        log::info!("records: document {id} {} → {status}", doc.status);
        doc.status = status;
        Ok(())
    }

    /// Set or clear (blank input) the reviewer notes.
    pub fn set_notes(&mut self, id: &str, notes: &str) -> Result<(), RecordError> {
        let doc = self.get_mut(id)?;
        let notes = notes.trim();
        doc.notes = (!notes.is_empty()).then(|| notes.to_string());
        Ok(())
    }

    /// Distinct districts, sorted, for the district dropdown.
    pub fn districts(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.documents.iter().map(|d| d.district.as_str()).collect();
        set.into_iter().collect()
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats::from_documents(&self.documents)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut OcrDocument, RecordError> {
        self.documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| RecordError::UnknownDocument(id.to_string()))
    }
}

impl Default for ReviewQueue {
    fn default() -> Self {
        Self::new(sample_documents())
    }
}

// ---------------------------------------------------------------------------
// Report export
// ---------------------------------------------------------------------------

/// Plain-text report offered by the "download" action.
pub fn document_report(doc: &OcrDocument) -> String {
    let mut report = format!(
        "OCR Document Report\n\n\
         Document ID: {}\n\
         Agent: {} ({})\n\
         Location: {}, {}\n\
         Document Type: {}\n\
         Confidence: {}%\n\
         Timestamp: {}\n\
         Status: {}\n",
        doc.id,
        doc.agent_name,
        doc.agent_id,
        doc.district,
        doc.state,
        doc.document_type,
        doc.confidence,
        doc.timestamp.format("%d/%m/%Y, %H:%M:%S"),
        doc.status,
    );
    if let Some(survey) = &doc.survey_id {
        report.push_str(&format!("Survey ID: {survey}\n"));
    }
    report.push_str(&format!("\nExtracted Text:\n{}\n", doc.extracted_text));
    if let Some(notes) = &doc.notes {
        report.push_str(&format!("\nNotes:\n{notes}\n"));
    }
    report
}

/// `ocr-document-<id>.txt`
pub fn report_file_name(doc: &OcrDocument) -> String {
    format!("ocr-document-{}.txt", doc.id)
}

pub fn export_document(doc: &OcrDocument, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(report_file_name(doc));
    write_text_file(&path, &document_report(doc))?;
    log::info!("records: exported {} to {}", doc.id, path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(docs: &[&OcrDocument]) -> Vec<String> {
        docs.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn query_searches_text_agent_and_district() {
        let docs = sample_documents();
        let by = |q: &str| {
            ids(&DocumentFilter {
                query: q.into(),
                ..DocumentFilter::default()
            }
            .apply(&docs))
        };

        assert_eq!(by("किसान"), vec!["OCR001"]);
        assert_eq!(by("priya"), vec!["OCR002"]);
        assert_eq!(by("HYDERABAD"), vec!["OCR003"]);
        assert_eq!(by("name:").len(), 3);
        assert!(by("Pune").is_empty());
        assert_eq!(by("").len(), 3);
    }

    #[test]
    fn dropdowns_combine_with_query() {
        let docs = sample_documents();
        let filter = DocumentFilter {
            query: "name".into(),
            status: Some(DocumentStatus::Approved),
            district: Some("Surat".into()),
        };
        assert_eq!(ids(&filter.apply(&docs)), vec!["OCR002"]);

        let filter = DocumentFilter {
            district: Some("Surat".into()),
            status: Some(DocumentStatus::Pending),
            ..DocumentFilter::default()
        };
        assert!(filter.apply(&docs).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let docs = sample_documents();
        let filter = DocumentFilter {
            query: "gujarat".into(),
            ..DocumentFilter::default()
        };
        let once: Vec<OcrDocument> = filter.apply(&docs).into_iter().cloned().collect();
        let twice: Vec<OcrDocument> = filter.apply(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn stats_match_fixture() {
        let stats = DocumentStats::from_documents(&sample_documents());
        assert_eq!(
            stats,
            DocumentStats {
                total: 3,
                pending: 1,
                approved: 1,
                average_confidence: 94,
            }
        );
        assert_eq!(DocumentStats::from_documents(&[]).average_confidence, 0);
    }

    #[test]
    fn review_queue_updates_status_and_notes() {
        let mut queue = ReviewQueue::default();
        queue.set_status("OCR001", DocumentStatus::Approved).unwrap();
        queue.set_notes("OCR001", "  verified with agent  ").unwrap();

        let doc = queue.get("OCR001").unwrap();
        assert_eq!(doc.status, DocumentStatus::Approved);
        assert_eq!(doc.notes.as_deref(), Some("verified with agent"));
        assert_eq!(queue.stats().approved, 2);

        assert_eq!(
            queue.set_status("OCR999", DocumentStatus::Rejected),
            Err(RecordError::UnknownDocument("OCR999".into()))
        );
    }

    #[test]
    fn districts_are_distinct_and_sorted() {
        assert_eq!(
            ReviewQueue::default().districts(),
            vec!["Ahmadabad", "Hyderabad", "Surat"]
        );
    }

    #[test]
    fn report_contains_metadata_and_text() {
        let doc = &sample_documents()[1];
        let report = document_report(doc);

        assert!(report.starts_with("OCR Document Report\n\n"));
        assert!(report.contains("Agent: Priya Patel (AG002)\n"));
        assert!(report.contains("Location: Surat, Gujarat\n"));
        assert!(report.contains("Confidence: 98%\n"));
        assert!(report.contains("Timestamp: 15/01/2024, 09:15:00\n"));
        assert!(report.contains("Status: approved\n"));
        assert!(report.ends_with(&format!("Extracted Text:\n{}\n", doc.extracted_text)));
        assert_eq!(report_file_name(doc), "ocr-document-OCR002.txt");
    }

    #[test]
    fn export_writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = &sample_documents()[0];
        let path = export_document(doc, dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), document_report(doc));
    }
}
