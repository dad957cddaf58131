// Excel table import (xlsx, xls, ods): first sheet → header row + data rows.
//
// One-way conversion. Cell values are coerced to display strings up front so
// downstream normalization never sees raw numeric/date binary forms.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use cargolink_merge::model::Table;

/// Read the first sheet of a workbook held in memory.
///
/// Merged-cell regions are expanded before the grid is split into header
/// and data rows: the anchor (top-left) value is copied into every covered
/// cell that has no value of its own, so header-to-value mapping never sees
/// a blank cell inside what the author considered one merged label.
pub fn read_table(bytes: &[u8], source_name: &str) -> Result<Table, String> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| format!("failed to open workbook '{}': {}", source_name, e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| format!("workbook '{}' contains no sheets", source_name))?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        format!(
            "failed to read sheet '{}' of '{}': {}",
            sheet_name, source_name, e
        )
    })?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(Table::new(source_name, Vec::new(), Vec::new()));
    }

    // Dense grid addressed from the top-left of the used range.
    let mut grid: Vec<Vec<String>> = vec![vec![String::new(); width]; height];
    for (r, row) in range.rows().enumerate() {
        for (c, value) in row.iter().enumerate() {
            grid[r][c] = cell_text(value);
        }
    }

    let origin = range.start().unwrap_or((0, 0));
    expand_merged_regions(&mut workbook, &sheet_name, origin, &mut grid);

    let mut rows = grid.into_iter();
    let headers = rows.next().unwrap_or_default();

    Ok(Table::new(source_name, headers, rows.collect()))
}

/// Copy each merged region's anchor value into the blank cells it covers.
/// Only xlsx records merged regions; other formats load as-is.
fn expand_merged_regions(
    workbook: &mut Sheets<Cursor<Vec<u8>>>,
    sheet_name: &str,
    origin: (u32, u32),
    grid: &mut [Vec<String>],
) {
    let Sheets::Xlsx(xlsx) = workbook else {
        return;
    };
    if xlsx.load_merged_regions().is_err() {
        return;
    }

    let height = grid.len();
    let width = grid.first().map_or(0, |row| row.len());
    let (origin_row, origin_col) = (origin.0 as usize, origin.1 as usize);

    for (_, _, dims) in xlsx.merged_regions_by_sheet(sheet_name) {
        let (start_row, start_col) = (dims.start.0 as usize, dims.start.1 as usize);
        let (end_row, end_col) = (dims.end.0 as usize, dims.end.1 as usize);
        if start_row < origin_row || start_col < origin_col {
            continue;
        }

        let anchor = match grid
            .get(start_row - origin_row)
            .and_then(|row| row.get(start_col - origin_col))
        {
            Some(value) if !value.is_empty() => value.clone(),
            _ => continue,
        };

        for r in start_row..=end_row {
            for c in start_col..=end_col {
                let (gr, gc) = (r - origin_row, c - origin_col);
                if gr >= height || gc >= width {
                    continue;
                }
                if grid[gr][gc].is_empty() {
                    grid[gr][gc] = anchor.clone();
                }
            }
        }
    }
}

/// Coerce one cell to its display string.
fn cell_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(t) if t.time() == chrono::NaiveTime::MIN => t.format("%Y-%m-%d").to_string(),
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}", dt.as_f64()),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
