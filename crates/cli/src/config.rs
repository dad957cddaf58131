//! Ingestion limits, optionally overridden from a TOML config file.
//!
//! The limits guard the upload boundary, not the engine: a rejected file
//! never reaches the loader.

use std::path::Path;

use serde::Deserialize;

use crate::CliError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestLimits {
    /// Most dispatch files accepted in one merge.
    pub max_dispatch_files: usize,
    /// Per-file size ceiling in bytes.
    pub max_file_bytes: u64,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_dispatch_files: 20,
            max_file_bytes: 10 * 1024 * 1024,
        }
    }
}

impl IngestLimits {
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("cannot read config '{}': {e}", path.display())))?;
        let limits: Self = toml::from_str(&text)
            .map_err(|e| CliError::parse(format!("config parse error: {e}")))?;
        limits.validate()?;
        Ok(limits)
    }

    fn validate(&self) -> Result<(), CliError> {
        if self.max_dispatch_files == 0 {
            return Err(CliError::usage("max_dispatch_files must be at least 1"));
        }
        if self.max_file_bytes == 0 {
            return Err(CliError::usage("max_file_bytes must be positive"));
        }
        Ok(())
    }
}
