//! `cargolink merge` — load, link, validate, report.

use std::fs;
use std::path::{Path, PathBuf};

use cargolink_merge::model::{MergeReport, MergeResponse, Table};
use cargolink_store::{MergeStore, NewSavedMerge};

use crate::config::IngestLimits;
use crate::saved::resolve_db_path;
use crate::CliError;

pub struct MergeArgs {
    pub dispatch: Vec<PathBuf>,
    pub sales: PathBuf,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub save: Option<String>,
    pub description: Option<String>,
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let limits = IngestLimits::load(args.config.as_deref())?;
    check_upload(&args.dispatch, &args.sales, &limits)?;

    // Failure boundary: any loader error collapses into the single failure
    // shape; nothing partial is emitted.
    let report = match load_and_merge(&args.dispatch, &args.sales) {
        Ok(report) => report,
        Err(message) => {
            emit_response(&MergeResponse::failure(message.clone()), &args)?;
            return Err(CliError::parse(message));
        }
    };

    // Human summary to stderr, never part of the payload.
    eprintln!(
        "{} records — {} matched, {} unmatched, {} issue(s)",
        report.total_records,
        report.matched_records,
        report.unmatched_records,
        report.validation_issues.len(),
    );

    if let Some(ref path) = args.export {
        cargolink_io::write_records(&report.data, path).map_err(CliError::io)?;
        eprintln!("exported {}", path.display());
    }

    if let Some(ref name) = args.save {
        let db_path = resolve_db_path(args.db.as_deref())?;
        let store = MergeStore::open(&db_path).map_err(CliError::io)?;
        let source_files: Vec<String> = args
            .dispatch
            .iter()
            .chain(std::iter::once(&args.sales))
            .map(|p| file_name(p))
            .collect();
        let id = store
            .save(&NewSavedMerge {
                name,
                description: args.description.as_deref(),
                total_records: report.total_records,
                matched_records: report.matched_records,
                unmatched_records: report.unmatched_records,
                records: &report.data,
                source_files: &source_files,
            })
            .map_err(CliError::io)?;
        eprintln!("saved as #{} in {}", id, db_path.display());
    }

    emit_response(&MergeResponse::success(report), &args)?;
    Ok(())
}

fn check_upload(dispatch: &[PathBuf], sales: &Path, limits: &IngestLimits) -> Result<(), CliError> {
    if dispatch.is_empty() {
        return Err(CliError::usage("at least one --dispatch file is required"));
    }
    if dispatch.len() > limits.max_dispatch_files {
        return Err(CliError::usage(format!(
            "{} dispatch files exceed the limit of {}",
            dispatch.len(),
            limits.max_dispatch_files
        )));
    }
    for path in dispatch {
        check_file(path, limits)?;
    }
    check_file(sales, limits)
}

fn check_file(path: &Path, limits: &IngestLimits) -> Result<(), CliError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    if !matches!(ext.as_deref(), Some("xlsx") | Some("xls")) {
        return Err(
            CliError::usage(format!("'{}' is not an Excel file", path.display()))
                .with_hint("only .xlsx and .xls uploads are accepted"),
        );
    }

    let meta = fs::metadata(path)
        .map_err(|e| CliError::io(format!("cannot stat '{}': {e}", path.display())))?;
    if meta.len() > limits.max_file_bytes {
        return Err(CliError::usage(format!(
            "'{}' exceeds the {} MiB size ceiling",
            path.display(),
            limits.max_file_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

fn load_and_merge(dispatch: &[PathBuf], sales: &Path) -> Result<MergeReport, String> {
    let mut dispatch_tables = Vec::with_capacity(dispatch.len());
    for path in dispatch {
        dispatch_tables.push(read_table_file(path)?);
    }
    let sales_table = read_table_file(sales)?;
    Ok(cargolink_merge::run(&dispatch_tables, &sales_table))
}

fn read_table_file(path: &Path) -> Result<Table, String> {
    let bytes = fs::read(path).map_err(|e| format!("cannot read '{}': {e}", path.display()))?;
    cargolink_io::read_table(&bytes, &file_name(path))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn emit_response(response: &MergeResponse, args: &MergeArgs) -> Result<(), CliError> {
    if !args.json && args.output.is_none() {
        return Ok(());
    }

    let json = serde_json::to_string_pretty(response)
        .map_err(|e| CliError::error(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        fs::write(path, &json)
            .map_err(|e| CliError::io(format!("cannot write '{}': {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }
    if args.json {
        println!("{json}");
    }
    Ok(())
}
