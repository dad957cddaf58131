//! Merge orchestration: linkage → validation → ordering → summary.

use crate::linkage::{
    build_dispatch_aggregates, build_sales_aggregates, matched_count, merge_records, sort_records,
};
use crate::model::{MergeReport, Table};
use crate::validate::validate;

/// Run one merge over pre-loaded tables.
///
/// Total function of its inputs: expected anomalies become validation
/// issues inside the report, never errors. The failure boundary for
/// unreadable workbooks sits with the caller that parsed the bytes.
pub fn run(dispatch_tables: &[Table], sales_table: &Table) -> MergeReport {
    let dispatch = build_dispatch_aggregates(dispatch_tables);
    let sales = build_sales_aggregates(sales_table);

    let validation_issues = validate(dispatch_tables, sales_table);

    let mut data = merge_records(&dispatch, &sales);
    sort_records(&mut data);

    let total_records = data.len();
    let matched_records = matched_count(&dispatch, &sales);

    MergeReport {
        data,
        total_records,
        matched_records,
        unmatched_records: total_records - matched_records,
        validation_issues,
    }
}
