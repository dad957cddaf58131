//! `cargolink-store` — saved merge results in a local SQLite file.
//!
//! The engine never reads or writes this store; callers persist a result
//! they want to keep and fetch it back later. Records and source file names
//! are stored as JSON payloads alongside the summary counts.

use std::path::Path;

use cargolink_merge::model::MergedRecord;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS saved_merges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL,
    total_records INTEGER NOT NULL,
    matched_records INTEGER NOT NULL,
    unmatched_records INTEGER NOT NULL,
    data TEXT NOT NULL,          -- MergedRecord[] as JSON
    source_files TEXT NOT NULL   -- originating file names as JSON
);
"#;

/// One stored result set, fully hydrated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMerge {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub total_records: usize,
    pub matched_records: usize,
    pub unmatched_records: usize,
    pub records: Vec<MergedRecord>,
    pub source_files: Vec<String>,
}

/// Listing row: everything except the record payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMergeSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub total_records: usize,
    pub matched_records: usize,
    pub unmatched_records: usize,
}

/// Fields supplied by the caller when saving a result.
#[derive(Debug)]
pub struct NewSavedMerge<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub total_records: usize,
    pub matched_records: usize,
    pub unmatched_records: usize,
    pub records: &'a [MergedRecord],
    pub source_files: &'a [String],
}

pub struct MergeStore {
    conn: Connection,
}

impl MergeStore {
    pub fn open(path: &Path) -> Result<Self, String> {
        let conn = Connection::open(path).map_err(|e| e.to_string())?;
        conn.execute_batch(SCHEMA).map_err(|e| e.to_string())?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory().map_err(|e| e.to_string())?;
        conn.execute_batch(SCHEMA).map_err(|e| e.to_string())?;
        Ok(Self { conn })
    }

    /// Insert a result set and return its id.
    pub fn save(&self, new: &NewSavedMerge) -> Result<i64, String> {
        let data = serde_json::to_string(new.records).map_err(|e| e.to_string())?;
        let source_files = serde_json::to_string(new.source_files).map_err(|e| e.to_string())?;

        self.conn
            .execute(
                "INSERT INTO saved_merges
                 (name, description, created_at, total_records, matched_records, unmatched_records, data, source_files)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    new.name,
                    new.description,
                    Utc::now().to_rfc3339(),
                    new.total_records as i64,
                    new.matched_records as i64,
                    new.unmatched_records as i64,
                    data,
                    source_files,
                ],
            )
            .map_err(|e| e.to_string())?;

        Ok(self.conn.last_insert_rowid())
    }

    /// All stored results, newest first.
    pub fn list(&self) -> Result<Vec<SavedMergeSummary>, String> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, description, created_at, total_records, matched_records, unmatched_records
                 FROM saved_merges ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| e.to_string())?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SavedMergeSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    created_at: row.get(3)?,
                    total_records: row.get::<_, i64>(4)? as usize,
                    matched_records: row.get::<_, i64>(5)? as usize,
                    unmatched_records: row.get::<_, i64>(6)? as usize,
                })
            })
            .map_err(|e| e.to_string())?;

        rows.collect::<Result<Vec<_>, _>>().map_err(|e| e.to_string())
    }

    /// Fetch one stored result with its full record payload.
    pub fn get(&self, id: i64) -> Result<Option<SavedMerge>, String> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, description, created_at, total_records, matched_records, unmatched_records, data, source_files
                 FROM saved_merges WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, String>(7)?,
                        row.get::<_, String>(8)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| e.to_string())?;

        let Some((id, name, description, created_at, total, matched, unmatched, data, files)) = raw
        else {
            return Ok(None);
        };

        let records: Vec<MergedRecord> = serde_json::from_str(&data).map_err(|e| e.to_string())?;
        let source_files: Vec<String> = serde_json::from_str(&files).map_err(|e| e.to_string())?;

        Ok(Some(SavedMerge {
            id,
            name,
            description,
            created_at,
            total_records: total as usize,
            matched_records: matched as usize,
            unmatched_records: unmatched as usize,
            records,
            source_files,
        }))
    }

    /// Delete one stored result. Returns whether a row existed.
    pub fn delete(&self, id: i64) -> Result<bool, String> {
        let n = self
            .conn
            .execute("DELETE FROM saved_merges WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(n > 0)
    }
}
