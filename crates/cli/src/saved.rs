//! `cargolink saved` — inspect previously saved merge results.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use cargolink_store::MergeStore;

use crate::CliError;

#[derive(Subcommand)]
pub enum SavedCommands {
    /// List saved results, newest first
    List {
        /// Store database path (defaults to the local data directory)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Print the listing as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print one saved result as JSON
    Show {
        /// Saved result id
        id: i64,

        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Delete one saved result
    Delete {
        /// Saved result id
        id: i64,

        #[arg(long)]
        db: Option<PathBuf>,
    },
}

pub fn cmd_saved(cmd: SavedCommands) -> Result<(), CliError> {
    match cmd {
        SavedCommands::List { db, json } => cmd_list(db.as_deref(), json),
        SavedCommands::Show { id, db } => cmd_show(id, db.as_deref()),
        SavedCommands::Delete { id, db } => cmd_delete(id, db.as_deref()),
    }
}

/// Default store location: `<local data dir>/cargolink/merges.db`.
pub fn resolve_db_path(db: Option<&Path>) -> Result<PathBuf, CliError> {
    if let Some(path) = db {
        return Ok(path.to_path_buf());
    }
    let base = dirs::data_local_dir()
        .ok_or_else(|| CliError::io("no local data directory available; pass --db"))?;
    let dir = base.join("cargolink");
    std::fs::create_dir_all(&dir)
        .map_err(|e| CliError::io(format!("cannot create '{}': {e}", dir.display())))?;
    Ok(dir.join("merges.db"))
}

fn open_store(db: Option<&Path>) -> Result<MergeStore, CliError> {
    let path = resolve_db_path(db)?;
    MergeStore::open(&path).map_err(CliError::io)
}

fn cmd_list(db: Option<&Path>, json: bool) -> Result<(), CliError> {
    let store = open_store(db)?;
    let listing = store.list().map_err(CliError::io)?;

    if json {
        let out = serde_json::to_string_pretty(&listing)
            .map_err(|e| CliError::error(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    if listing.is_empty() {
        eprintln!("no saved merges");
        return Ok(());
    }

    for entry in &listing {
        println!(
            "#{}  {}  {}  {} records ({} matched)",
            entry.id, entry.created_at, entry.name, entry.total_records, entry.matched_records,
        );
    }
    Ok(())
}

fn cmd_show(id: i64, db: Option<&Path>) -> Result<(), CliError> {
    let store = open_store(db)?;
    let saved = store
        .get(id)
        .map_err(CliError::io)?
        .ok_or_else(|| CliError::error(format!("no saved merge #{id}")))?;

    let out = serde_json::to_string_pretty(&saved)
        .map_err(|e| CliError::error(format!("JSON serialization error: {e}")))?;
    println!("{out}");
    Ok(())
}

fn cmd_delete(id: i64, db: Option<&Path>) -> Result<(), CliError> {
    let store = open_store(db)?;
    if !store.delete(id).map_err(CliError::io)? {
        return Err(CliError::error(format!("no saved merge #{id}")));
    }
    eprintln!("deleted #{id}");
    Ok(())
}
