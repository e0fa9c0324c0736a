//! Persistence of inventory contents between sessions.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::inventory::CellItem;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// One occupied cell as written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCellItem {
    pub cell_id: usize,
    pub data: CellItem,
}

/// Backend holding the saved inventory.
///
/// Everything runs on the UI thread, so backends are synchronous and need
/// not be `Send`.
pub trait InventoryStorage {
    /// Replace the saved inventory.
    fn save(&self, items: &[SavedCellItem]) -> StorageResult<()>;

    /// Load the saved inventory. An empty list means nothing was saved yet.
    fn load(&self) -> StorageResult<Vec<SavedCellItem>>;
}

pub(crate) fn to_json(items: &[SavedCellItem]) -> StorageResult<String> {
    serde_json::to_string_pretty(items).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub(crate) fn from_json(json: &str) -> StorageResult<Vec<SavedCellItem>> {
    serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))
}
