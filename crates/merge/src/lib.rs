//! `cargolink-merge` — dispatch/sales record-linkage and normalization engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns merged records and
//! data-quality findings. No file or network I/O.

pub mod columns;
pub mod engine;
pub mod linkage;
pub mod model;
pub mod normalize;
pub mod validate;

pub use engine::run;
pub use model::{MergeReport, MergeResponse, MergedRecord, Table, ValidationIssue};
