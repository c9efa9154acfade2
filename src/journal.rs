//! JSON file of performed operations, used by the `installer-ops` binary.
//!
//! Records are kept in perform order. Undo consumes them from the end.

use crate::error::Result;
use crate::ops::OperationRecord;

use std::fs;
use std::path::{Path, PathBuf};

/// Operation records persisted between `perform` and `undo` runs.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    records: Vec<OperationRecord>,
}

impl Journal {
    /// Loads the journal at `path`. A missing file is an empty journal.
    pub fn load(path: &Path) -> Result<Self> {
        let records = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read {}: {}", path.display(), e),
                )
                .into());
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, record: OperationRecord) {
        self.records.push(record);
    }

    /// Most recently performed record.
    pub fn last(&self) -> Option<&OperationRecord> {
        self.records.last()
    }

    pub fn pop(&mut self) -> Option<OperationRecord> {
        self.records.pop()
    }

    /// Writes the journal back, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, content).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {}", self.path.display(), e),
            )
        })?;
        log::debug!(
            "Saved {} record(s) to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }
}
