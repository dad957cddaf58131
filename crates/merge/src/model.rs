use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One loaded sheet: a header row plus data rows, all display strings.
///
/// The loader guarantees a uniform grid, so column resolution against
/// `headers` applies to every row. Cells are `""` when empty.
#[derive(Debug, Clone)]
pub struct Table {
    /// Originating file name, cited in validation messages.
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Per-key fields contributed by dispatch rows. First occurrence wins; later
/// rows with the same key never touch an existing aggregate.
#[derive(Debug, Clone)]
pub struct DispatchAggregate {
    pub raw_number: String,
    pub reg_date: String,
    pub fee: String,
    pub commission: String,
}

/// Per-key fields contributed by sales rows. Last occurrence wins; each new
/// row with a seen key overwrites the stored aggregate.
#[derive(Debug, Clone)]
pub struct SalesAggregate {
    pub raw_number: String,
    pub pickup: String,
    pub dropoff: String,
    pub customer: String,
    pub receipt_time: String,
    pub dispatch_time: String,
}

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

/// One joined output row. All fields are display strings, never recomputed
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRecord {
    pub cargo_number: String,
    pub date: String,
    pub pickup: String,
    pub dropoff: String,
    pub customer: String,
    pub fee: String,
    pub commission: String,
    pub total: String,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    MissingCargoNumber,
    DuplicateCargoNumber,
    MissingRequiredField,
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCargoNumber => write!(f, "missing_cargo_number"),
            Self::DuplicateCargoNumber => write!(f, "duplicate_cargo_number"),
            Self::MissingRequiredField => write!(f, "missing_required_field"),
        }
    }
}

/// A non-fatal data-quality finding attached to a specific row or field.
///
/// `row` is the 1-based display row number as a spreadsheet user sees it
/// (header row counted, so raw data index + 2).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ---------------------------------------------------------------------------
// Report + transport shape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub data: Vec<MergedRecord>,
    pub total_records: usize,
    pub matched_records: usize,
    pub unmatched_records: usize,
    pub validation_issues: Vec<ValidationIssue>,
}

/// Serialized transport shape: the whole merge either succeeds with a report
/// or collapses into a single failure message. Nothing partial crosses the
/// boundary.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MergeResponse {
    Success {
        success: bool,
        #[serde(flatten)]
        report: MergeReport,
    },
    Failure {
        success: bool,
        error: String,
    },
}

impl MergeResponse {
    pub fn success(report: MergeReport) -> Self {
        Self::Success {
            success: true,
            report,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_serializes_without_absent_fields() {
        let issue = ValidationIssue {
            severity: Severity::Error,
            category: IssueCategory::MissingCargoNumber,
            message: "row 3: cargo number is missing".into(),
            row: Some(3),
            cargo_number: None,
            field: None,
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["category"], "missing_cargo_number");
        assert_eq!(json["row"], 3);
        assert!(json.get("cargoNumber").is_none());
        assert!(json.get("field").is_none());
    }

    #[test]
    fn response_shapes() {
        let report = MergeReport {
            data: Vec::new(),
            total_records: 0,
            matched_records: 0,
            unmatched_records: 0,
            validation_issues: Vec::new(),
        };
        let ok = serde_json::to_value(MergeResponse::success(report)).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["totalRecords"], 0);
        assert!(ok["data"].as_array().unwrap().is_empty());

        let err = serde_json::to_value(MergeResponse::failure("boom")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "boom");
        assert!(err.get("data").is_none());
    }
}
