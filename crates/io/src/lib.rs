//! `cargolink-io` — spreadsheet I/O for the merge pipeline.
//!
//! Import: Excel bytes → `Table` (first sheet, merged regions expanded,
//! cells coerced to display strings). Export: merged records back into an
//! xlsx for sharing. The engine crate itself never touches files.

pub mod export;
pub mod xlsx;

pub use export::write_records;
pub use xlsx::read_table;
