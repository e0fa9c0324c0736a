//! In-memory storage implementation.

use super::{InventoryStorage, SavedCellItem, StorageResult};
use std::cell::{Cell, RefCell};

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<Vec<SavedCellItem>>,
    saves: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with a saved inventory.
    pub fn with_items(items: Vec<SavedCellItem>) -> Self {
        Self {
            items: RefCell::new(items),
            saves: Cell::new(0),
        }
    }

    /// Number of saves performed.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl InventoryStorage for MemoryStorage {
    fn save(&self, items: &[SavedCellItem]) -> StorageResult<()> {
        *self.items.borrow_mut() = items.to_vec();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn load(&self) -> StorageResult<Vec<SavedCellItem>> {
        Ok(self.items.borrow().clone())
    }
}
