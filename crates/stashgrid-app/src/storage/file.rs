//! JSON file storage for native platforms.

use super::{InventoryStorage, SavedCellItem, StorageError, StorageResult, from_json, to_json};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores the inventory as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InventoryStorage for FileStorage {
    fn save(&self, items: &[SavedCellItem]) -> StorageResult<()> {
        let json = to_json(items)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(&self.path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", self.path.display(), e)))
    }

    fn load(&self) -> StorageResult<Vec<SavedCellItem>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", self.path.display(), e)))?;
        from_json(&json)
    }
}
