//! Element host abstraction.
//!
//! The engine never touches a real widget tree. Everything it needs from the
//! hosting UI goes through [`ElementHost`]: hit testing, bounding boxes,
//! deep clones and class/style primitives. [`MemoryScene`] is an in-memory
//! implementation used by tests and the headless host application.

mod memory;

pub use memory::MemoryScene;

use crate::error::DndResult;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a visual element in the host scene.
pub type ElementId = Uuid;

/// Stacking order used for drag ghosts so they render above all content.
pub const GHOST_Z_INDEX: i32 = 999_999;

/// Fixed-position style applied to a drag ghost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostStyle {
    /// Top-left corner in screen coordinates.
    pub origin: Point,
    /// Size copied from the source element's bounding box.
    pub size: Size,
    pub z_index: i32,
    /// `false` until the ghost is positioned for the first time.
    pub visible: bool,
    /// Whether the ghost intercepts hit testing. Always `false` for ghosts.
    pub pointer_events: bool,
}

impl GhostStyle {
    /// Initial ghost style: sized to `bounds`, hidden, non-interactive.
    pub fn hidden(bounds: Rect) -> Self {
        Self {
            origin: bounds.origin(),
            size: bounds.size(),
            z_index: GHOST_Z_INDEX,
            visible: false,
            pointer_events: false,
        }
    }

    /// Move the ghost and make it visible.
    pub fn placed_at(self, origin: Point) -> Self {
        Self {
            origin,
            visible: true,
            ..self
        }
    }

    /// Screen rectangle covered by the ghost.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }
}

/// Capabilities the engine requires from the hosting UI.
///
/// Class operations on unknown elements are silently ignored, matching how a
/// detached element simply has nothing to update.
pub trait ElementHost {
    /// Topmost interactive element at `point`, if any.
    fn element_at(&self, point: Point) -> Option<ElementId>;

    /// Bounding box of an element in screen coordinates.
    fn bounds(&self, element: ElementId) -> DndResult<Rect>;

    /// Whether `element` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool;

    /// Deep-clone an element and its subtree. The clone starts detached.
    fn deep_clone(&mut self, element: ElementId) -> DndResult<ElementId>;

    /// Attach an element at the top level of the document.
    fn append_to_document(&mut self, element: ElementId) -> DndResult<()>;

    /// Remove an element (and its subtree) from the scene.
    fn remove(&mut self, element: ElementId);

    fn add_class(&mut self, element: ElementId, class: &str);

    fn remove_class(&mut self, element: ElementId, class: &str);

    fn has_class(&self, element: ElementId, class: &str) -> bool;

    /// Apply fixed-position ghost styling to an element.
    fn set_ghost_style(&mut self, element: ElementId, style: GhostStyle) -> DndResult<()>;
}
