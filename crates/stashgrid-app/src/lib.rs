//! Stashgrid Application
//!
//! Headless inventory board driving the Stashgrid engine: a grid of cells
//! whose items can be rearranged by long-press drag and drop.

mod board;
mod config;
mod inventory;
mod script;
mod storage;

pub use board::{BoardMove, CELL_ITEM_KIND, InventoryBoard};
pub use config::{BoardConfig, ConfigError, MAX_CELLS};
pub use inventory::{CellItem, GridCell, Inventory, MoveResult, Placement};
pub use script::{Script, Step};
pub use storage::{FileStorage, InventoryStorage, MemoryStorage, SavedCellItem, StorageError, StorageResult};
