//! File-backed [`SaveHook`] that writes the teardown snapshot as JSON.

use smeltery_core::{EconomySnapshot, SaveError, SaveHook};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes each snapshot it receives to `path` as pretty-printed JSON,
/// replacing any previous contents.
///
/// The document is written to a sibling temporary file first and then renamed
/// over `path`, so a crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct JsonFileSaveHook {
    path: PathBuf,
}

impl JsonFileSaveHook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SaveHook for JsonFileSaveHook {
    fn save(&mut self, snapshot: &EconomySnapshot) -> Result<(), SaveError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| SaveError::Encode(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = self.staging_path();
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;

        log::info!("saved economy snapshot to {}", self.path.display());
        Ok(())
    }
}

/// Read back a snapshot written by [`JsonFileSaveHook`].
pub fn read_snapshot(path: &Path) -> Result<EconomySnapshot, SaveError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| SaveError::Encode(e.to_string()))
}
