//! Keyed aggregation and the dispatch↔sales merge.
//!
//! The two sources fold repeated keys differently: dispatch sheets keep the
//! first row seen, the sales sheet lets later rows overwrite. The policy is
//! an explicit parameter so the asymmetry stays visible and pinned by tests.

use std::collections::HashMap;

use crate::columns::{
    resolve_column, DISPATCH_COMMISSION, DISPATCH_DATE, DISPATCH_FEE, DISPATCH_NUMBER,
    SALES_CUSTOMER, SALES_DISPATCH_TIME, SALES_DROPOFF, SALES_NUMBER, SALES_PICKUP,
    SALES_RECEIPT_TIME,
};
use crate::model::{DispatchAggregate, MergedRecord, SalesAggregate, Table};
use crate::normalize::{
    group_thousands, is_row_empty, normalize_date, normalize_identifier, normalize_number,
    normalize_value, parse_numeric, split_fee_commission,
};

/// How repeated keys within one source fold into its aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep the first row seen for a key (dispatch files).
    FirstWins,
    /// Let each later row overwrite the stored aggregate (sales file).
    LastWins,
}

/// Key-addressed aggregates with deterministic first-seen ordering.
///
/// The order vector records each key once, at first insertion; overwrites
/// under `LastWins` never reorder. Iterating `keys()` therefore replays the
/// original scan order, which downstream sorting uses as its tie-break.
#[derive(Debug)]
pub struct KeyedAggregates<T> {
    entries: HashMap<String, T>,
    order: Vec<String>,
    policy: MergePolicy,
}

impl<T> KeyedAggregates<T> {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            policy,
        }
    }

    pub fn insert(&mut self, key: String, value: T) {
        match self.policy {
            MergePolicy::FirstWins => {
                if !self.entries.contains_key(&key) {
                    self.order.push(key.clone());
                    self.entries.insert(key, value);
                }
            }
            MergePolicy::LastWins => {
                if !self.entries.contains_key(&key) {
                    self.order.push(key.clone());
                }
                self.entries.insert(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn cell<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

/// Fold all dispatch tables, in upload order, into per-key aggregates.
///
/// A table whose identifier column does not resolve contributes nothing.
/// Fee cells may carry the combined `fee[commission]` form; a non-empty
/// bracket part outranks the separate commission column.
pub fn build_dispatch_aggregates(tables: &[Table]) -> KeyedAggregates<DispatchAggregate> {
    let mut aggs = KeyedAggregates::new(MergePolicy::FirstWins);

    for table in tables {
        let Some(number_col) = resolve_column(&table.headers, DISPATCH_NUMBER) else {
            continue;
        };
        let date_col = resolve_column(&table.headers, DISPATCH_DATE);
        let fee_col = resolve_column(&table.headers, DISPATCH_FEE);
        let commission_col = resolve_column(&table.headers, DISPATCH_COMMISSION);

        for row in &table.rows {
            if is_row_empty(row) {
                continue;
            }
            let raw_number = normalize_value(cell(row, Some(number_col)));
            let key = normalize_identifier(&raw_number);
            if key.is_empty() {
                continue;
            }

            let (fee, bracket_commission) = split_fee_commission(cell(row, fee_col));
            let commission = if bracket_commission.is_empty() {
                normalize_value(cell(row, commission_col))
            } else {
                bracket_commission
            };

            aggs.insert(
                key,
                DispatchAggregate {
                    raw_number,
                    reg_date: normalize_value(cell(row, date_col)),
                    fee,
                    commission,
                },
            );
        }
    }

    aggs
}

/// Fold the sales table into per-key aggregates, later rows overwriting.
pub fn build_sales_aggregates(table: &Table) -> KeyedAggregates<SalesAggregate> {
    let mut aggs = KeyedAggregates::new(MergePolicy::LastWins);

    let Some(number_col) = resolve_column(&table.headers, SALES_NUMBER) else {
        return aggs;
    };
    let pickup_col = resolve_column(&table.headers, SALES_PICKUP);
    let dropoff_col = resolve_column(&table.headers, SALES_DROPOFF);
    let customer_col = resolve_column(&table.headers, SALES_CUSTOMER);
    let receipt_col = resolve_column(&table.headers, SALES_RECEIPT_TIME);
    let dispatch_time_col = resolve_column(&table.headers, SALES_DISPATCH_TIME);

    for row in &table.rows {
        if is_row_empty(row) {
            continue;
        }
        let raw_number = normalize_value(cell(row, Some(number_col)));
        let key = normalize_identifier(&raw_number);
        if key.is_empty() {
            continue;
        }

        aggs.insert(
            key,
            SalesAggregate {
                raw_number,
                pickup: normalize_value(cell(row, pickup_col)),
                dropoff: normalize_value(cell(row, dropoff_col)),
                customer: normalize_value(cell(row, customer_col)),
                receipt_time: normalize_value(cell(row, receipt_col)),
                dispatch_time: normalize_value(cell(row, dispatch_time_col)),
            },
        );
    }

    aggs
}

fn non_empty(v: &str) -> Option<&str> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

/// Union the two key sets and emit one record per key, dispatch keys first
/// then sales-only keys, each side in first-seen order.
pub fn merge_records(
    dispatch: &KeyedAggregates<DispatchAggregate>,
    sales: &KeyedAggregates<SalesAggregate>,
) -> Vec<MergedRecord> {
    let union = dispatch
        .keys()
        .chain(sales.keys().filter(|k| !dispatch.contains(k)));

    let mut records = Vec::with_capacity(dispatch.len() + sales.len());
    for key in union {
        let d = dispatch.get(key);
        let s = sales.get(key);

        let cargo_number = d
            .and_then(|d| non_empty(&d.raw_number))
            .or_else(|| s.and_then(|s| non_empty(&s.raw_number)))
            .unwrap_or(key)
            .to_string();

        let raw_date = d
            .and_then(|d| non_empty(&d.reg_date))
            .or_else(|| s.and_then(|s| non_empty(&s.receipt_time)))
            .or_else(|| s.and_then(|s| non_empty(&s.dispatch_time)))
            .unwrap_or("");

        let fee = d.map(|d| d.fee.as_str()).unwrap_or("");
        let commission = d.map(|d| d.commission.as_str()).unwrap_or("");
        let total = parse_numeric(fee) + parse_numeric(commission);

        records.push(MergedRecord {
            cargo_number,
            date: normalize_date(raw_date),
            pickup: s.map(|s| s.pickup.clone()).unwrap_or_default(),
            dropoff: s.map(|s| s.dropoff.clone()).unwrap_or_default(),
            customer: s.map(|s| s.customer.clone()).unwrap_or_default(),
            fee: normalize_number(fee),
            commission: normalize_number(commission),
            total: if total > 0.0 {
                group_thousands(total)
            } else {
                String::new()
            },
        });
    }

    records
}

/// Ascending by normalized date; records without a date sort after all
/// dated ones. The sort is stable, so ties keep production order.
pub fn sort_records(records: &mut [MergedRecord]) {
    records.sort_by(|a, b| {
        (a.date.is_empty(), a.date.as_str()).cmp(&(b.date.is_empty(), b.date.as_str()))
    });
}

/// Keys present in both aggregates.
pub fn matched_count(
    dispatch: &KeyedAggregates<DispatchAggregate>,
    sales: &KeyedAggregates<SalesAggregate>,
) -> usize {
    dispatch.keys().filter(|k| sales.contains(k)).count()
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

    #[test]
    fn dispatch_first_occurrence_wins() {
        let t = table(
            "dispatch.xlsx",
            &["번호", "등록일자", "운송료"],
            &[
                &["100", "2024-01-01", "1000"],
                &["100", "2024-02-02", "9999"],
            ],
        );
        let aggs = build_dispatch_aggregates(std::slice::from_ref(&t));
        assert_eq!(aggs.len(), 1);
        let agg = aggs.get("100").unwrap();
        assert_eq!(agg.reg_date, "2024-01-01");
        assert_eq!(agg.fee, "1000");
    }

    #[test]
    fn sales_last_occurrence_wins() {
        let t = table(
            "sales.xlsx",
            &["화물번호", "상차지"],
            &[&["200", "서울"], &["200", "부산"]],
        );
        let aggs = build_sales_aggregates(&t);
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs.get("200").unwrap().pickup, "부산");
    }

    #[test]
    fn first_seen_order_survives_overwrites() {
        let t = table(
            "sales.xlsx",
            &["화물번호", "상차지"],
            &[&["2", "a"], &["1", "b"], &["2", "c"]],
        );
        let aggs = build_sales_aggregates(&t);
        let order: Vec<&String> = aggs.keys().collect();
        assert_eq!(order, ["2", "1"]);
        assert_eq!(aggs.get("2").unwrap().pickup, "c");
    }

    #[test]
    fn bracket_commission_outranks_commission_column() {
        let t = table(
            "dispatch.xlsx",
            &["번호", "운송료", "수수료"],
            &[&["1", "10,000[1,000]", "500"], &["2", "20,000", "700"]],
        );
        let aggs = build_dispatch_aggregates(std::slice::from_ref(&t));
        assert_eq!(aggs.get("1").unwrap().commission, "1,000");
        assert_eq!(aggs.get("2").unwrap().commission, "700");
    }

    #[test]
    fn keyless_rows_are_skipped() {
        let t = table(
            "dispatch.xlsx",
            &["번호", "운송료"],
            &[&["", "1000"], &["취소", "2000"], &["3", "3000"]],
        );
        let aggs = build_dispatch_aggregates(std::slice::from_ref(&t));
        assert_eq!(aggs.len(), 1);
        assert!(aggs.contains("3"));
    }

    #[test]
    fn missing_identifier_column_contributes_nothing() {
        let t = table("dispatch.xlsx", &["금액", "비고"], &[&["1000", "x"]]);
        let aggs = build_dispatch_aggregates(std::slice::from_ref(&t));
        assert!(aggs.is_empty());
    }

    #[test]
    fn date_precedence_chain() {
        let dispatch = table(
            "d.xlsx",
            &["번호", "등록일자"],
            &[&["1", "2024-01-05"], &["2", ""]],
        );
        let sales = table(
            "s.xlsx",
            &["화물번호", "접수시간", "배차시간"],
            &[&["1", "2024-02-02", "2024-03-03"], &["2", "", "2024-04-04"]],
        );
        let d = build_dispatch_aggregates(std::slice::from_ref(&dispatch));
        let s = build_sales_aggregates(&sales);
        let records = merge_records(&d, &s);
        assert_eq!(records[0].date, "2024-01-05");
        assert_eq!(records[1].date, "2024-04-04");
    }

    #[test]
    fn total_suppressed_at_zero() {
        let t = table("d.xlsx", &["번호", "운송료"], &[&["1", "0"], &["2", "100"]]);
        let d = build_dispatch_aggregates(std::slice::from_ref(&t));
        let s = KeyedAggregates::new(MergePolicy::LastWins);
        let records = merge_records(&d, &s);
        assert_eq!(records[0].total, "");
        assert_eq!(records[1].total, "100");
    }

    #[test]
    fn sort_places_empty_dates_last() {
        let mut records = vec![
            MergedRecord {
                cargo_number: "1".into(),
                date: "".into(),
                pickup: String::new(),
                dropoff: String::new(),
                customer: String::new(),
                fee: String::new(),
                commission: String::new(),
                total: String::new(),
            },
            MergedRecord {
                cargo_number: "2".into(),
                date: "2024-02-01".into(),
                pickup: String::new(),
                dropoff: String::new(),
                customer: String::new(),
                fee: String::new(),
                commission: String::new(),
                total: String::new(),
            },
            MergedRecord {
                cargo_number: "3".into(),
                date: "2024-01-01".into(),
                pickup: String::new(),
                dropoff: String::new(),
                customer: String::new(),
                fee: String::new(),
                commission: String::new(),
                total: String::new(),
            },
        ];
        sort_records(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.cargo_number.as_str()).collect();
        assert_eq!(order, ["3", "2", "1"]);
    }
}
