//! Inventory model behind the board.

use crate::storage::SavedCellItem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stack of items occupying one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellItem {
    pub code: String,
    pub count: u32,
}

impl CellItem {
    pub fn new(code: impl Into<String>, count: u32) -> Self {
        Self {
            code: code.into(),
            count,
        }
    }
}

/// One slot of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub id: usize,
    pub item: Option<CellItem>,
}

/// Initial placement of an item, as read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub cell: usize,
    pub code: String,
    pub count: u32,
}

/// Result of [`Inventory::move_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The item moved into an empty cell.
    Moved,
    /// Both cells were occupied and exchanged contents.
    Swapped,
    /// Nothing to do: same cell, empty source or out-of-range index.
    Unchanged,
}

/// Fixed-size grid of cells plus display metadata for item codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    cells: Vec<GridCell>,
    titles: HashMap<String, String>,
}

impl Default for Inventory {
    fn default() -> Self {
        let mut inventory = Self::new(16);
        for placement in default_placements() {
            inventory.place(placement.cell, CellItem::new(placement.code, placement.count));
        }
        inventory.titles = default_titles();
        inventory
    }
}

impl Inventory {
    /// An inventory of `size` empty cells.
    pub fn new(size: usize) -> Self {
        Self {
            cells: (0..size).map(|id| GridCell { id, item: None }).collect(),
            titles: HashMap::new(),
        }
    }

    /// An inventory of `size` cells filled from saved records. Records for
    /// cells outside the grid are dropped.
    pub fn from_saved(size: usize, items: Vec<SavedCellItem>) -> Self {
        let mut inventory = Self::new(size);
        for saved in items {
            if saved.cell_id >= size {
                log::warn!("Dropping saved '{}' for missing cell {}", saved.data.code, saved.cell_id);
                continue;
            }
            inventory.place(saved.cell_id, saved.data);
        }
        inventory
    }

    /// Occupied cells in storage form, in cell order.
    pub fn saved_items(&self) -> Vec<SavedCellItem> {
        self.cells
            .iter()
            .filter_map(|cell| {
                cell.item.clone().map(|data| SavedCellItem {
                    cell_id: cell.id,
                    data,
                })
            })
            .collect()
    }

    pub fn with_titles(mut self, titles: HashMap<String, String>) -> Self {
        self.titles = titles;
        self
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn item(&self, cell: usize) -> Option<&CellItem> {
        self.cells.get(cell).and_then(|c| c.item.as_ref())
    }

    /// Put an item in a cell, returning what was there. Out-of-range cells
    /// hand the item back.
    pub fn place(&mut self, cell: usize, item: CellItem) -> Option<CellItem> {
        match self.cells.get_mut(cell) {
            Some(slot) => slot.item.replace(item),
            None => Some(item),
        }
    }

    /// Move the item in `from` to `to`, swapping if `to` is occupied.
    pub fn move_item(&mut self, from: usize, to: usize) -> MoveResult {
        if from == to || to >= self.cells.len() {
            return MoveResult::Unchanged;
        }
        let Some(item) = self.cells.get_mut(from).and_then(|c| c.item.take()) else {
            return MoveResult::Unchanged;
        };
        let displaced = self.cells[to].item.replace(item);
        let result = if displaced.is_some() {
            MoveResult::Swapped
        } else {
            MoveResult::Moved
        };
        self.cells[from].item = displaced;
        result
    }

    /// Human-readable title for an item code, falling back to the code.
    pub fn title_for<'a>(&'a self, code: &'a str) -> &'a str {
        self.titles.get(code).map(String::as_str).unwrap_or(code)
    }

    /// One line per occupied cell, for logs.
    pub fn summary(&self) -> Vec<String> {
        self.cells
            .iter()
            .filter_map(|cell| {
                cell.item
                    .as_ref()
                    .map(|item| format!("#{} {} x{}", cell.id, self.title_for(&item.code), item.count))
            })
            .collect()
    }
}

pub fn default_placements() -> Vec<Placement> {
    vec![
        Placement {
            cell: 0,
            code: "green-box".to_string(),
            count: 10,
        },
        Placement {
            cell: 1,
            code: "golden-box".to_string(),
            count: 2,
        },
        Placement {
            cell: 2,
            code: "blue-box".to_string(),
            count: 6,
        },
    ]
}

pub fn default_titles() -> HashMap<String, String> {
    [
        ("green-box", "Green Box"),
        ("golden-box", "Golden Box"),
        ("blue-box", "Blue Box"),
    ]
    .into_iter()
    .map(|(code, title)| (code.to_string(), title.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_inventory() {
        let inventory = Inventory::default();
        assert_eq!(inventory.item(0), Some(&CellItem::new("green-box", 10)));
        assert_eq!(inventory.item(1), Some(&CellItem::new("golden-box", 2)));
        assert_eq!(inventory.item(2), Some(&CellItem::new("blue-box", 6)));
        assert_eq!(inventory.item(3), None);
        assert_eq!(inventory.title_for("golden-box"), "Golden Box");
    }

    #[test]
    fn test_move_into_empty_cell() {
        let mut inventory = Inventory::default();

        assert_eq!(inventory.move_item(0, 5), MoveResult::Moved);

        assert_eq!(inventory.item(0), None);
        assert_eq!(inventory.item(5), Some(&CellItem::new("green-box", 10)));
    }

    #[test]
    fn test_move_onto_occupied_cell_swaps() {
        let mut inventory = Inventory::default();

        assert_eq!(inventory.move_item(0, 2), MoveResult::Swapped);

        assert_eq!(inventory.item(0).unwrap().code, "blue-box");
        assert_eq!(inventory.item(2).unwrap().code, "green-box");
    }

    #[test]
    fn test_noop_moves() {
        let mut inventory = Inventory::default();
        let before = inventory.clone();

        assert_eq!(inventory.move_item(1, 1), MoveResult::Unchanged);
        assert_eq!(inventory.move_item(7, 0), MoveResult::Unchanged);
        assert_eq!(inventory.move_item(0, 99), MoveResult::Unchanged);
        assert_eq!(inventory, before);
    }

    #[test]
    fn test_saved_items_restore_contents() {
        let mut inventory = Inventory::default();
        inventory.move_item(0, 9);

        let saved = inventory.saved_items();
        assert_eq!(saved.iter().map(|s| s.cell_id).collect::<Vec<_>>(), vec![1, 2, 9]);

        let restored = Inventory::from_saved(16, saved).with_titles(default_titles());
        assert_eq!(restored, inventory);
    }

    #[test]
    fn test_saved_items_outside_grid_are_dropped() {
        let saved = vec![
            SavedCellItem {
                cell_id: 1,
                data: CellItem::new("blue-box", 1),
            },
            SavedCellItem {
                cell_id: 40,
                data: CellItem::new("green-box", 1),
            },
        ];

        let inventory = Inventory::from_saved(4, saved);

        assert_eq!(inventory.summary(), vec!["#1 blue-box x1"]);
    }

    #[test]
    fn test_unknown_code_title_falls_back() {
        let inventory = Inventory::new(4);
        assert_eq!(inventory.title_for("red-box"), "red-box");
    }

    #[test]
    fn test_summary_lists_occupied_cells() {
        let inventory = Inventory::default();
        assert_eq!(
            inventory.summary(),
            vec!["#0 Green Box x10", "#1 Golden Box x2", "#2 Blue Box x6"]
        );
    }
}
