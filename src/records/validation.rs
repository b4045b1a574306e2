//! Validation errors raised against submitted surveys.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use super::{at, matches_query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingData,
    LogicalError,
    LocationMismatch,
    FormatError,
    Duplicate,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::MissingData => "missing_data",
            ErrorKind::LogicalError => "logical_error",
            ErrorKind::LocationMismatch => "location_mismatch",
            ErrorKind::FormatError => "format_error",
            ErrorKind::Duplicate => "duplicate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorStatus {
    Pending,
    Fixed,
    Ignored,
}

impl ErrorStatus {
    pub const ALL: [ErrorStatus; 3] = [ErrorStatus::Pending, ErrorStatus::Fixed, ErrorStatus::Ignored];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorStatus::Pending => "pending",
            ErrorStatus::Fixed => "fixed",
            ErrorStatus::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub id: String,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub description: String,
    pub field: String,
    pub value: String,
    pub suggestion: String,
    pub agent_id: String,
    pub agent_name: String,
    pub district: String,
    pub state: String,
    pub survey_id: String,
    pub timestamp: NaiveDateTime,
    pub status: ErrorStatus,
    pub auto_fixable: bool,
}

pub fn sample_errors() -> Vec<ValidationError> {
    vec![
        ValidationError {
            id: "ERR001".into(),
            kind: ErrorKind::LogicalError,
            severity: Severity::High,
            description: "Age and occupation mismatch detected".into(),
            field: "age_occupation".into(),
            value: "Age: 3, Occupation: Software Engineer".into(),
            suggestion: "Please verify respondent age or occupation".into(),
            agent_id: "AG001".into(),
            agent_name: "Rajesh Kumar".into(),
            district: "Ahmadabad".into(),
            state: "Gujarat".into(),
            survey_id: "SUR001".into(),
            timestamp: at(2024, 1, 15, 10, 30),
            status: ErrorStatus::Pending,
            auto_fixable: false,
        },
        ValidationError {
            id: "ERR002".into(),
            kind: ErrorKind::MissingData,
            severity: Severity::Medium,
            description: "Household income field is empty".into(),
            field: "household_income".into(),
            value: String::new(),
            suggestion: "Auto-fill with district average or request re-survey".into(),
            agent_id: "AG002".into(),
            agent_name: "Priya Patel".into(),
            district: "Surat".into(),
            state: "Gujarat".into(),
            survey_id: "SUR002".into(),
            timestamp: at(2024, 1, 15, 9, 15),
            status: ErrorStatus::Pending,
            auto_fixable: true,
        },
        ValidationError {
            id: "ERR003".into(),
            kind: ErrorKind::FormatError,
            severity: Severity::Low,
            description: "Phone number format incorrect".into(),
            field: "phone_number".into(),
            value: "98765-43210".into(),
            suggestion: "Format as +91-98765-43210".into(),
            agent_id: "AG003".into(),
            agent_name: "Mohammed Ali".into(),
            district: "Hyderabad".into(),
            state: "Telangana".into(),
            survey_id: "SUR003".into(),
            timestamp: at(2024, 1, 14, 16, 45),
            status: ErrorStatus::Pending,
            auto_fixable: true,
        },
    ]
}

// ---------------------------------------------------------------------------
// Overview figures
// ---------------------------------------------------------------------------

/// Headline numbers of the validation overview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationStats {
    pub total_surveys: u32,
    pub validated_surveys: u32,
    pub pending_validation: u32,
    /// Percent.
    pub error_rate: f32,
    pub auto_fixed_errors: u32,
    pub manual_review_needed: u32,
    pub real_time_validations: u32,
    pub avg_validation_secs: f32,
}

impl ValidationStats {
    pub fn sample() -> Self {
        Self {
            total_surveys: 45_678,
            validated_surveys: 43_234,
            pending_validation: 2_444,
            error_rate: 5.3,
            auto_fixed_errors: 1_876,
            manual_review_needed: 568,
            real_time_validations: 12_456,
            avg_validation_secs: 2.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryTrend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCategory {
    pub kind: ErrorKind,
    pub label: &'static str,
    pub count: u32,
    pub percentage: f32,
    pub trend: CategoryTrend,
    pub examples: [&'static str; 3],
}

/// Error breakdown shown on the overview, largest first.
pub fn error_categories() -> Vec<ErrorCategory> {
    vec![
        ErrorCategory {
            kind: ErrorKind::MissingData,
            label: "Missing Data",
            count: 25_400,
            percentage: 45.2,
            trend: CategoryTrend::Down,
            examples: ["Household income missing", "Phone number blank", "Education level not specified"],
        },
        ErrorCategory {
            kind: ErrorKind::LogicalError,
            label: "Logical Errors",
            count: 10_000,
            percentage: 17.8,
            trend: CategoryTrend::Stable,
            examples: ["Age = 2, Occupation = Farmer", "Income > 10 lakhs in rural area", "Child with PhD"],
        },
        ErrorCategory {
            kind: ErrorKind::FormatError,
            label: "Format Errors",
            count: 8_200,
            percentage: 14.6,
            trend: CategoryTrend::Down,
            examples: ["Invalid phone format", "Incorrect PIN code", "Wrong date format"],
        },
        ErrorCategory {
            kind: ErrorKind::LocationMismatch,
            label: "Location Mismatches",
            count: 6_800,
            percentage: 12.1,
            trend: CategoryTrend::Up,
            examples: ["GPS vs reported address", "Wrong district code", "State boundary issues"],
        },
        ErrorCategory {
            kind: ErrorKind::Duplicate,
            label: "Duplicate Entries",
            count: 5_700,
            percentage: 10.3,
            trend: CategoryTrend::Stable,
            examples: ["Same household surveyed twice", "Duplicate Aadhaar numbers", "Repeated responses"],
        },
    ]
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFilter {
    pub query: String,
    pub severity: Option<Severity>,
    pub status: Option<ErrorStatus>,
}

impl ErrorFilter {
    pub fn matches(&self, error: &ValidationError) -> bool {
        self.severity.map_or(true, |s| error.severity == s)
            && self.status.map_or(true, |s| error.status == s)
            && matches_query(
                &self.query,
                &[
                    error.description.as_str(),
                    error.agent_name.as_str(),
                    error.district.as_str(),
                ],
            )
    }

    pub fn apply<'a>(&self, errors: &'a [ValidationError]) -> Vec<&'a ValidationError> {
        errors.iter().filter(|e| self.matches(e)).collect()
    }
}

// ---------------------------------------------------------------------------
// Selection / bulk actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Fix,
    Ignore,
    Reassign,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::Fix => "fix",
            BulkAction::Ignore => "ignore",
            BulkAction::Reassign => "reassign",
        }
    }

    /// Status the selected errors end up in.  Reassigning leaves them
    /// pending for the new agent.
    pub fn resulting_status(self) -> Option<ErrorStatus> {
        match self {
            BulkAction::Fix => Some(ErrorStatus::Fixed),
            BulkAction::Ignore => Some(ErrorStatus::Ignored),
            BulkAction::Reassign => None,
        }
    }
}

/// Checkbox selection in the error list.
#[derive(Debug, Clone, Default)]
pub struct ErrorSelection {
    selected: BTreeSet<String>,
}

impl ErrorSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// The bulk-action bar is shown only while this is `false`.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Run `action` on the selection: logs it, clears the selection and
    /// returns the ids it applied to (sorted).
    pub fn bulk_action(&mut self, action: BulkAction) -> Vec<String> {
        let ids: Vec<String> = std::mem::take(&mut self.selected).into_iter().collect();
        log::info!("records: bulk {} for errors {:?}", action.as_str(), ids);
        ids
    }
}

/// Apply the status change of `action` to the errors in `ids`.  Returns how
/// many records changed.
pub fn apply_bulk(errors: &mut [ValidationError], action: BulkAction, ids: &[String]) -> usize {
    let Some(status) = action.resulting_status() else {
        return 0;
    };
    let mut changed = 0;
    for error in errors.iter_mut().filter(|e| ids.contains(&e.id)) {
        if error.status != status {
            error.status = status;
            changed += 1;
        }
    }
    changed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
