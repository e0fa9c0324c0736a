//! Serializable drag and drop configuration.

use crate::error::{DndError, DndResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default long-press delay before a drag starts.
pub const DEFAULT_START_DELAY_MS: u64 = 100;

fn default_start_delay_ms() -> u64 {
    DEFAULT_START_DELAY_MS
}

/// Options for a draggable source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragOptions {
    /// Match key compared against dropzone `accepts`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Long-press delay in milliseconds.
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,
    /// Class added to the source element while it is being dragged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragging_class: Option<String>,
    /// Class added to the floating clone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragging_clone_class: Option<String>,
}

impl DragOptions {
    /// Options with the default start delay and no marker classes.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            start_delay_ms: DEFAULT_START_DELAY_MS,
            dragging_class: None,
            dragging_clone_class: None,
        }
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_dragging_class(mut self, class: impl Into<String>) -> Self {
        self.dragging_class = Some(class.into());
        self
    }

    pub fn with_dragging_clone_class(mut self, class: impl Into<String>) -> Self {
        self.dragging_clone_class = Some(class.into());
        self
    }

    /// Long-press delay as a duration.
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Parse and validate options from JSON.
    pub fn from_json(json: &str) -> DndResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject options that can never match a dropzone.
    pub fn validate(&self) -> DndResult<()> {
        if self.kind.trim().is_empty() {
            return Err(DndError::InvalidOptions("draggable type must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Options for a dropzone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropOptions {
    /// Draggable type this zone accepts.
    pub accepts: String,
    /// Class added to the zone while an acceptable draggable hovers it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_zone_class: Option<String>,
}

impl DropOptions {
    pub fn new(accepts: impl Into<String>) -> Self {
        Self {
            accepts: accepts.into(),
            drop_zone_class: None,
        }
    }

    pub fn with_drop_zone_class(mut self, class: impl Into<String>) -> Self {
        self.drop_zone_class = Some(class.into());
        self
    }

    /// Parse and validate options from JSON.
    pub fn from_json(json: &str) -> DndResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> DndResult<()> {
        if self.accepts.trim().is_empty() {
            return Err(DndError::InvalidOptions("dropzone accepts must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_options_defaults() {
        let options = DragOptions::from_json(r#"{"type": "crate"}"#).unwrap();
        assert_eq!(options.kind, "crate");
        assert_eq!(options.start_delay(), Duration::from_millis(100));
        assert!(options.dragging_class.is_none());
        assert!(options.dragging_clone_class.is_none());
    }

    #[test]
    fn test_drag_options_full() {
        let options = DragOptions::from_json(
            r#"{"type": "crate", "start_delay_ms": 0, "dragging_class": "lifted", "dragging_clone_class": "ghost"}"#,
        )
        .unwrap();
        assert_eq!(options.start_delay(), Duration::ZERO);
        assert_eq!(options.dragging_class.as_deref(), Some("lifted"));
        assert_eq!(options.dragging_clone_class.as_deref(), Some("ghost"));
    }

    #[test]
    fn test_empty_kind_rejected() {
        assert!(matches!(
            DragOptions::from_json(r#"{"type": "  "}"#),
            Err(DndError::InvalidOptions(_))
        ));
        assert!(matches!(
            DropOptions::from_json(r#"{"accepts": ""}"#),
            Err(DndError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_missing_kind_is_serialization_error() {
        assert!(matches!(
            DragOptions::from_json(r#"{"start_delay_ms": 10}"#),
            Err(DndError::Serialization(_))
        ));
    }

    #[test]
    fn test_builder_matches_json() {
        let built = DropOptions::new("crate").with_drop_zone_class("hover");
        let parsed = DropOptions::from_json(r#"{"accepts": "crate", "drop_zone_class": "hover"}"#).unwrap();
        assert_eq!(built, parsed);
    }
}
