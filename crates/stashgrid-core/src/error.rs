//! Error types for host-side failures.
//!
//! Drag outcomes (cancelled, rejected, failed drops) are not errors; they are
//! reported through [`crate::drag::ReleaseOutcome`]. These errors cover the
//! element host refusing an operation and malformed configuration.

use crate::scene::ElementId;
use thiserror::Error;

/// Drag-and-drop engine errors.
#[derive(Debug, Error)]
pub enum DndError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("Element is not attached to the document: {0}")]
    Detached(ElementId),
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type DndResult<T> = Result<T, DndError>;
