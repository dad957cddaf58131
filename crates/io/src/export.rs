// Merged-record export back into spreadsheet form.
//
// Presentation only: field order and the display strings the engine already
// produced are written verbatim, never recomputed.

use std::path::Path;

use cargolink_merge::model::MergedRecord;
use rust_xlsxwriter::{Format, Workbook};

const HEADERS: [&str; 8] = [
    "화물번호",
    "등록일자",
    "상차지",
    "하차지",
    "고객명",
    "운송료",
    "수수료",
    "합계",
];

/// Write the merged records to an xlsx file at `path`.
pub fn write_records(records: &[MergedRecord], path: &Path) -> Result<(), String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| format!("failed to write header row: {e}"))?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        let cells = [
            &record.cargo_number,
            &record.date,
            &record.pickup,
            &record.dropoff,
            &record.customer,
            &record.fee,
            &record.commission,
            &record.total,
        ];
        for (col, value) in cells.iter().enumerate() {
            worksheet
                .write_string(row, col as u16, value.as_str())
                .map_err(|e| format!("failed to write row {}: {e}", row + 1))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("failed to save '{}': {e}", path.display()))?;
    Ok(())
}
