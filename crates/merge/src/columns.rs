//! Header resolution under inconsistent naming.
//!
//! Source exports disagree on header spelling ("번호", "화물번호", "No.",
//! stray whitespace, mixed case). Each logical field carries an ordered
//! synonym list; resolution runs two deterministic passes over the header
//! row, so the same table of rules serves the linkage engine and the
//! validator alike.

// Ordered synonym tables, highest priority first. Shared, read-only.
pub const DISPATCH_NUMBER: &[&str] = &["번호", "화물번호", "no", "number"];
pub const DISPATCH_DATE: &[&str] = &["등록일자", "일자", "date", "날짜"];
pub const DISPATCH_FEE: &[&str] = &["운송료", "운송비", "fee"];
pub const DISPATCH_COMMISSION: &[&str] = &["수수료", "commission"];

pub const SALES_NUMBER: &[&str] = &["화물번호", "번호", "no", "number"];
pub const SALES_PICKUP: &[&str] = &["상차지", "상차", "loading", "pickup", "origin"];
pub const SALES_DROPOFF: &[&str] = &["하차지", "하차", "unloading", "dropoff", "destination"];
pub const SALES_CUSTOMER: &[&str] = &["고객명", "고객", "customer", "회사"];
pub const SALES_RECEIPT_TIME: &[&str] = &["접수시간", "접수"];
pub const SALES_DISPATCH_TIME: &[&str] = &["배차시간", "배차"];

/// Find the column for a field given its ordered synonym list.
///
/// Pass 1 accepts only exact matches (trimmed, case-folded). Pass 2 falls
/// back to substring containment. Every exact candidate outranks every
/// containment candidate; within a pass, synonyms are tried in priority
/// order and headers in declaration order. First hit wins.
///
/// `None` means the column does not exist in this table, which callers must
/// keep distinct from a resolvable column holding an empty cell.
pub fn resolve_column(headers: &[String], synonyms: &[&str]) -> Option<usize> {
    for synonym in synonyms {
        let want = synonym.trim().to_lowercase();
        for (idx, header) in headers.iter().enumerate() {
            if header.trim().to_lowercase() == want {
                return Some(idx);
            }
        }
    }
    for synonym in synonyms {
        let want = synonym.trim().to_lowercase();
        for (idx, header) in headers.iter().enumerate() {
            if header.trim().to_lowercase().contains(want.as_str()) {
                return Some(idx);
            }
        }
    }
    None
}
