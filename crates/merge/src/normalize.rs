//! Canonical string forms for raw cell values.
//!
//! Every function is total: malformed input falls back to the trimmed
//! original (or zero for arithmetic), never an error. Display strings use
//! comma-grouped thousands, matching the locale of the source exports.

use std::sync::OnceLock;

use regex::Regex;

/// Trimmed string form of a raw cell.
pub fn normalize_value(v: &str) -> String {
    v.trim().to_string()
}

/// Digits-only projection used as the linkage key. Idempotent; never
/// reorders digits. Returns `""` when nothing remains.
pub fn normalize_identifier(v: &str) -> String {
    v.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn year_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})[-./](\d{1,2})[-./](\d{1,2})").unwrap())
}

fn year_last_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})[-./](\d{1,2})[-./](\d{4}|\d{2})").unwrap())
}

/// Canonical `YYYY-MM-DD` form of a date-ish cell.
///
/// A 4-digit-year pattern anywhere in the string wins. Otherwise an
/// `A<sep>B<sep>C` pattern is read with C as the year: a 4-digit C maps
/// directly to `C-A-B`; a 2-digit C is expanded with the <50 pivot into the
/// 2000s, and A/B are swapped to day-month only when A exceeds 12 and B
/// does not. Ambiguous pairs read as month-day. Anything else is returned
/// trimmed and unchanged for display.
pub fn normalize_date(v: &str) -> String {
    let s = v.trim();
    if s.is_empty() {
        return String::new();
    }

    if let Some(c) = year_first_re().captures(s) {
        let (year, month, day) = (&c[1], &c[2], &c[3]);
        return format!("{year}-{month:0>2}-{day:0>2}");
    }

    if let Some(c) = year_last_re().captures(s) {
        let (a, b, y) = (&c[1], &c[2], &c[3]);
        if y.len() == 4 {
            return format!("{y}-{a:0>2}-{b:0>2}");
        }
        let century = if y.parse::<u32>().unwrap_or(0) < 50 { "20" } else { "19" };
        let an: u32 = a.parse().unwrap_or(0);
        let bn: u32 = b.parse().unwrap_or(0);
        let (month, day) = if an > 12 && bn <= 12 { (b, a) } else { (a, b) };
        return format!("{century}{y}-{month:0>2}-{day:0>2}");
    }

    s.to_string()
}

fn strip_numeric_noise(v: &str) -> String {
    v.chars()
        .filter(|c| !matches!(c, ',' | '(' | ')') && !c.is_whitespace())
        .collect()
}

/// Comma-grouped display form of a numeric cell. Empty stays empty;
/// unparsable input is returned trimmed for display as-is.
pub fn normalize_number(v: &str) -> String {
    let trimmed = v.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match strip_numeric_noise(trimmed).parse::<f64>() {
        Ok(n) => group_thousands(n),
        Err(_) => trimmed.to_string(),
    }
}

/// Numeric value for arithmetic only: zero on empty or unparsable input.
/// Never used for display.
pub fn parse_numeric(v: &str) -> f64 {
    strip_numeric_noise(v.trim()).parse::<f64>().unwrap_or(0.0)
}

/// Format a number with comma-grouped thousands. Fraction digits are kept
/// as produced, with no forced decimal places.
pub fn group_thousands(n: f64) -> String {
    let raw = if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    };
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

fn fee_commission_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^\[\]]*)\[([^\[\]]*)\]$").unwrap())
}

/// Split the combined `fee[commission]` cell form some dispatch exports use.
/// Without a bracket suffix the whole trimmed value is the fee and the
/// commission is empty.
pub fn split_fee_commission(v: &str) -> (String, String) {
    let s = v.trim();
    match fee_commission_re().captures(s) {
        Some(c) => (c[1].trim().to_string(), c[2].trim().to_string()),
        None => (s.to_string(), String::new()),
    }
}

/// True iff every cell trims to the empty string. Fully empty rows are
/// skipped by aggregation and validation alike.
pub fn is_row_empty(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}
