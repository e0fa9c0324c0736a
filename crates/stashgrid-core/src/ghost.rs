//! The floating clone that follows the pointer during a drag.

use crate::error::DndResult;
use crate::scene::{ElementHost, ElementId, GhostStyle};
use kurbo::{Point, Rect, Vec2};

/// Geometry captured when the pointer goes down on a draggable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grip {
    /// Element actually under the pointer: the bound element or a descendant.
    pub pressed: ElementId,
    /// Bounding box of the pressed element at press time.
    pub bounds: Rect,
    /// Pointer position relative to the box origin.
    pub offset: Vec2,
}

impl Grip {
    /// Snapshot the pressed element's geometry for a press at `pointer`.
    pub fn capture(host: &dyn ElementHost, source: ElementId, pointer: Point) -> DndResult<Self> {
        let pressed = host
            .element_at(pointer)
            .filter(|element| host.contains(source, *element))
            .unwrap_or(source);
        let bounds = host.bounds(pressed)?;
        Ok(Self {
            pressed,
            bounds,
            offset: pointer - bounds.origin(),
        })
    }

    /// Where the ghost's origin goes for a pointer at `pointer`.
    pub fn ghost_origin(&self, pointer: Point) -> Point {
        pointer - self.offset
    }
}

/// A live ghost element. Owned by exactly one drag; never shared.
#[derive(Debug, Clone)]
pub struct Ghost {
    element: ElementId,
    style: GhostStyle,
    grip: Grip,
}

impl Ghost {
    /// Clone the pressed element, style it as a hidden fixed overlay and
    /// attach it to the document.
    pub fn spawn(host: &mut dyn ElementHost, grip: Grip, clone_class: Option<&str>) -> DndResult<Self> {
        let element = host.deep_clone(grip.pressed)?;
        if let Some(class) = clone_class {
            host.add_class(element, class);
        }

        let style = GhostStyle::hidden(grip.bounds);
        let attached = host
            .set_ghost_style(element, style)
            .and_then(|()| host.append_to_document(element));
        if let Err(err) = attached {
            host.remove(element);
            return Err(err);
        }

        Ok(Self { element, style, grip })
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn style(&self) -> GhostStyle {
        self.style
    }

    /// Move the ghost under the pointer, keeping the original grip point,
    /// and make it visible.
    pub fn follow(&mut self, host: &mut dyn ElementHost, pointer: Point) -> DndResult<()> {
        self.style = self.style.placed_at(self.grip.ghost_origin(pointer));
        host.set_ghost_style(self.element, self.style)
    }

    /// Detach and discard the ghost.
    pub fn remove(self, host: &mut dyn ElementHost) {
        host.remove(self.element);
    }
}
