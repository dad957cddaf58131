//! Row-level data-quality scan.
//!
//! Runs over the raw tables, not the deduplicated aggregates, so every row
//! is seen. Findings are data, never control flow; the scan cannot fail.

use std::collections::HashSet;

use crate::columns::{
    resolve_column, DISPATCH_NUMBER, SALES_CUSTOMER, SALES_DROPOFF, SALES_NUMBER, SALES_PICKUP,
};
use crate::model::{IssueCategory, Severity, Table, ValidationIssue};
use crate::normalize::{is_row_empty, normalize_identifier, normalize_value};

/// Scan every source table and collect per-row findings.
pub fn validate(dispatch_tables: &[Table], sales_table: &Table) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for table in dispatch_tables {
        scan_dispatch(table, &mut issues);
    }
    scan_sales(sales_table, &mut issues);
    issues
}

fn cell<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

// Display row number as a spreadsheet user sees it: 1-based with the header
// row counted, so raw data index + 2.
fn display_row(idx: usize) -> usize {
    idx + 2
}

fn scan_dispatch(table: &Table, issues: &mut Vec<ValidationIssue>) {
    // Column absence is not a data-quality finding; an export without an
    // identifier column contributes no identifier checks at all.
    let Some(number_col) = resolve_column(&table.headers, DISPATCH_NUMBER) else {
        return;
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut last_key: Option<String> = None;

    for (idx, row) in table.rows.iter().enumerate() {
        if is_row_empty(row) {
            continue;
        }
        let key = normalize_identifier(&normalize_value(cell(row, Some(number_col))));

        // A row repeating the immediately preceding key is the tail of a
        // vertically merged cell, not a true duplicate. Skipped silently,
        // blank keys included.
        if last_key.as_deref() == Some(key.as_str()) {
            continue;
        }

        if key.is_empty() {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                category: IssueCategory::MissingCargoNumber,
                message: format!(
                    "dispatch file '{}' row {}: cargo number is missing",
                    table.source,
                    display_row(idx)
                ),
                row: Some(display_row(idx)),
                cargo_number: None,
                field: None,
            });
        } else if !seen.insert(key.clone()) {
            issues.push(ValidationIssue {
                severity: Severity::Warning,
                category: IssueCategory::DuplicateCargoNumber,
                message: format!(
                    "dispatch file '{}' row {}: duplicate cargo number {}",
                    table.source,
                    display_row(idx),
                    key
                ),
                row: Some(display_row(idx)),
                cargo_number: Some(key.clone()),
                field: None,
            });
        }

        last_key = Some(key);
    }
}

const SALES_REQUIRED: [(&str, &[&str]); 3] = [
    ("pickup", SALES_PICKUP),
    ("dropoff", SALES_DROPOFF),
    ("customer", SALES_CUSTOMER),
];

fn scan_sales(table: &Table, issues: &mut Vec<ValidationIssue>) {
    let number_col = resolve_column(&table.headers, SALES_NUMBER);
    let required_cols: Vec<(&str, Option<usize>)> = SALES_REQUIRED
        .iter()
        .map(|(name, synonyms)| (*name, resolve_column(&table.headers, synonyms)))
        .collect();

    for (idx, row) in table.rows.iter().enumerate() {
        if is_row_empty(row) {
            continue;
        }

        let key = match number_col {
            Some(col) => normalize_identifier(&normalize_value(cell(row, Some(col)))),
            None => String::new(),
        };

        if number_col.is_some() && key.is_empty() {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                category: IssueCategory::MissingCargoNumber,
                message: format!(
                    "sales file '{}' row {}: cargo number is missing",
                    table.source,
                    display_row(idx)
                ),
                row: Some(display_row(idx)),
                cargo_number: None,
                field: None,
            });
        }

        // Field checks only make sense for rows that can be linked.
        if key.is_empty() {
            continue;
        }

        for (name, col) in &required_cols {
            if normalize_value(cell(row, *col)).is_empty() {
                issues.push(ValidationIssue {
                    severity: Severity::Warning,
                    category: IssueCategory::MissingRequiredField,
                    message: format!(
                        "sales file '{}' row {}: cargo {}: {} is missing",
                        table.source,
                        display_row(idx),
                        key,
                        name
                    ),
                    row: Some(display_row(idx)),
                    cargo_number: Some(key.clone()),
                    field: Some((*name).to_string()),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(source: &str, headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            source,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn empty_sales() -> Table {
        table("sales.xlsx", &["화물번호", "상차지", "하차지", "고객명"], &[])
    }

    #[test]
    fn missing_key_cites_display_row() {
        let d = table(
            "dispatch.xlsx",
            &["번호", "운송료"],
            &[&["1", "100"], &["", "200"]],
        );
        let issues = validate(std::slice::from_ref(&d), &empty_sales());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::MissingCargoNumber);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].row, Some(3));
        assert!(issues[0].message.contains("dispatch.xlsx"));
    }

    #[test]
    fn consecutive_duplicate_is_merged_cell_continuation() {
        let d = table(
            "dispatch.xlsx",
            &["번호"],
            &[&["1"], &["1"], &["1"], &["2"]],
        );
        let issues = validate(std::slice::from_ref(&d), &empty_sales());
        assert!(issues.is_empty());
    }

    #[test]
    fn gapped_duplicate_is_flagged_once() {
        let d = table("dispatch.xlsx", &["번호"], &[&["1"], &["2"], &["1"]]);
        let issues = validate(std::slice::from_ref(&d), &empty_sales());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::DuplicateCargoNumber);
        assert_eq!(issues[0].cargo_number.as_deref(), Some("1"));
        assert_eq!(issues[0].row, Some(4));
    }

    #[test]
    fn consecutive_blank_keys_flag_once() {
        let d = table("dispatch.xlsx", &["번호", "비고"], &[&["", "a"], &["", "b"]]);
        let issues = validate(std::slice::from_ref(&d), &empty_sales());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, Some(2));
    }

    #[test]
    fn absent_identifier_column_suppresses_checks() {
        let d = table("dispatch.xlsx", &["금액"], &[&["100"], &[""]]);
        let issues = validate(std::slice::from_ref(&d), &empty_sales());
        assert!(issues.is_empty());
    }

    #[test]
    fn duplicates_tracked_per_file() {
        let a = table("a.xlsx", &["번호"], &[&["1"]]);
        let b = table("b.xlsx", &["번호"], &[&["1"]]);
        let issues = validate(&[a, b], &empty_sales());
        assert!(issues.is_empty());
    }

    #[test]
    fn sales_required_fields() {
        let s = table(
            "sales.xlsx",
            &["화물번호", "상차지", "하차지", "고객명"],
            &[&["1", "서울", "", "김씨"], &["2", "서울", "부산", "이씨"]],
        );
        let issues = validate(&[], &s);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::MissingRequiredField);
        assert_eq!(issues[0].field.as_deref(), Some("dropoff"));
        assert_eq!(issues[0].cargo_number.as_deref(), Some("1"));
    }

    #[test]
    fn sales_absent_field_column_counts_as_missing() {
        let s = table("sales.xlsx", &["화물번호", "상차지"], &[&["1", "서울"]]);
        let issues = validate(&[], &s);
        let fields: Vec<&str> = issues
            .iter()
            .filter_map(|i| i.field.as_deref())
            .collect();
        assert_eq!(fields, ["dropoff", "customer"]);
    }

    #[test]
    fn sales_missing_key_skips_field_checks() {
        let s = table(
            "sales.xlsx",
            &["화물번호", "상차지", "하차지", "고객명"],
            &[&["", "서울", "", ""]],
        );
        let issues = validate(&[], &s);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, IssueCategory::MissingCargoNumber);
    }

    #[test]
    fn fully_empty_rows_are_invisible() {
        let d = table("dispatch.xlsx", &["번호"], &[&["1"], &[""], &["1"]]);
        // The blank middle row is fully empty and skipped, so rows 2 and 4
        // are consecutive for continuation purposes.
        let issues = validate(std::slice::from_ref(&d), &empty_sales());
        assert!(issues.is_empty());
    }
}
