//! Board configuration loaded from JSON.

use crate::inventory::{CellItem, Inventory, Placement, default_placements, default_titles};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use stashgrid_core::DEFAULT_START_DELAY_MS;
use thiserror::Error;

/// Errors raised while loading a board configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Upper bound on the number of grid cells.
pub const MAX_CELLS: usize = 4096;

/// Layout, timing and initial contents of the inventory board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub columns: usize,
    pub rows: usize,
    /// Edge length of a square cell, in scene units.
    pub cell_size: f64,
    pub start_delay_ms: u64,
    pub dragging_class: String,
    pub dragging_clone_class: String,
    pub drop_zone_class: String,
    pub items: Vec<Placement>,
    pub titles: HashMap<String, String>,
    /// JSON file the inventory is saved to after every move, if any.
    pub save_path: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 4,
            cell_size: 64.0,
            start_delay_ms: DEFAULT_START_DELAY_MS,
            dragging_class: "dragging".to_string(),
            dragging_clone_class: "dragging-clone".to_string(),
            drop_zone_class: "drop-zone".to_string(),
            items: default_placements(),
            titles: default_titles(),
            save_path: None,
        }
    }
}

impl BoardConfig {
    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded board configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of cells. Saturates for grids that fail validation.
    pub fn cell_count(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cells = self.columns.checked_mul(self.rows).ok_or_else(|| {
            ConfigError::Invalid(format!("{}x{} grid is too large", self.columns, self.rows))
        })?;
        if cells == 0 {
            return Err(ConfigError::Invalid("grid must have at least one cell".to_string()));
        }
        if cells > MAX_CELLS {
            return Err(ConfigError::Invalid(format!(
                "{}x{} grid exceeds {} cells",
                self.columns, self.rows, MAX_CELLS
            )));
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::Invalid(format!("cell_size must be positive, got {}", self.cell_size)));
        }
        if let Some(placement) = self.items.iter().find(|p| p.cell >= self.cell_count()) {
            return Err(ConfigError::Invalid(format!(
                "item '{}' placed in cell {} outside a {}x{} grid",
                placement.code, placement.cell, self.columns, self.rows
            )));
        }
        Ok(())
    }

    /// Build the initial inventory described by this configuration.
    pub fn inventory(&self) -> Inventory {
        let mut inventory = Inventory::new(self.cell_count()).with_titles(self.titles.clone());
        for placement in &self.items {
            inventory.place(placement.cell, CellItem::new(placement.code.clone(), placement.count));
        }
        inventory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_matches_default_inventory() {
        let config = BoardConfig::default();
        assert_eq!(config.inventory(), Inventory::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BoardConfig::from_json(r#"{ "columns": 2, "rows": 3, "start_delay_ms": 0 }"#).unwrap();

        assert_eq!(config.cell_count(), 6);
        assert_eq!(config.start_delay_ms, 0);
        assert_eq!(config.cell_size, 64.0);
        assert_eq!(config.drop_zone_class, "drop-zone");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "columns": 3, "rows": 1, "items": [{{ "cell": 2, "code": "red-box", "count": 4 }}], "titles": {{}} }}"#
        )
        .unwrap();

        let config = BoardConfig::load(file.path()).unwrap();
        let inventory = config.inventory();

        assert_eq!(inventory.len(), 3);
        assert_eq!(inventory.item(2), Some(&CellItem::new("red-box", 4)));
        assert_eq!(inventory.title_for("red-box"), "red-box");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BoardConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(BoardConfig::from_json("{ columns: "), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_item_outside_grid_is_rejected() {
        let err = BoardConfig::from_json(r#"{ "columns": 1, "rows": 1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let overflow = BoardConfig::from_json(r#"{ "columns": 4294967296, "rows": 4294967296 }"#);
        assert!(matches!(overflow, Err(ConfigError::Invalid(_))));

        let huge = BoardConfig::from_json(r#"{ "columns": 1000, "rows": 1000 }"#);
        assert!(matches!(huge, Err(ConfigError::Invalid(_))));

        let zero = BoardConfig::from_json(r#"{ "columns": 0, "rows": 5, "items": [] }"#);
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_path() {
        assert_eq!(BoardConfig::default().save_path, None);

        let config = BoardConfig::from_json(r#"{ "save_path": "saves/items.json" }"#).unwrap();
        assert_eq!(config.save_path, Some(PathBuf::from("saves/items.json")));
    }
}
