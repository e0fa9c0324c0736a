//! Drop targets.
//!
//! A dropzone keeps no acceptance state of its own: whether a draggable may
//! be dropped is recomputed from `accepts` on every check.

use crate::draggable::DragSubject;
use crate::options::DropOptions;
use crate::scene::{ElementHost, ElementId};
use std::cell::Cell;
use std::fmt;

/// Callback invoked with the draggable a dropzone is interacting with.
pub type SubjectHandler = Box<dyn Fn(&dyn DragSubject)>;

/// Optional dropzone callbacks. Absent handlers are no-ops.
#[derive(Default)]
pub struct DropHandlers {
    on_enter: Option<SubjectHandler>,
    on_leave: Option<SubjectHandler>,
    on_drop_attempt: Option<SubjectHandler>,
    on_failed_drop: Option<SubjectHandler>,
    on_successful_drop: Option<SubjectHandler>,
}

impl DropHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called on each pointer sample an acceptable draggable hovers the zone.
    pub fn on_enter(mut self, f: impl Fn(&dyn DragSubject) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Called when a hovering draggable moves away or is dropped.
    pub fn on_leave(mut self, f: impl Fn(&dyn DragSubject) + 'static) -> Self {
        self.on_leave = Some(Box::new(f));
        self
    }

    pub fn on_drop_attempt(mut self, f: impl Fn(&dyn DragSubject) + 'static) -> Self {
        self.on_drop_attempt = Some(Box::new(f));
        self
    }

    pub fn on_failed_drop(mut self, f: impl Fn(&dyn DragSubject) + 'static) -> Self {
        self.on_failed_drop = Some(Box::new(f));
        self
    }

    pub fn on_successful_drop(mut self, f: impl Fn(&dyn DragSubject) + 'static) -> Self {
        self.on_successful_drop = Some(Box::new(f));
        self
    }
}

fn notify(handler: &Option<SubjectHandler>, subject: &dyn DragSubject) {
    if let Some(handler) = handler {
        handler(subject);
    }
}

/// A drop target bound to an element.
pub struct Dropzone {
    accepts: String,
    element: Cell<Option<ElementId>>,
    drop_zone_class: Option<String>,
    handlers: DropHandlers,
}

impl Dropzone {
    /// Create an unbound dropzone.
    pub fn new(options: DropOptions, handlers: DropHandlers) -> Self {
        Self {
            accepts: options.accepts,
            element: Cell::new(None),
            drop_zone_class: options.drop_zone_class,
            handlers,
        }
    }

    pub fn accepts(&self) -> &str {
        &self.accepts
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element.get()
    }

    /// Bind the dropzone to an element, returning the same element so drag
    /// and drop roles can be composed on it.
    pub fn bind(&self, element: ElementId) -> ElementId {
        self.element.set(Some(element));
        element
    }

    pub fn unbind(&self) {
        self.element.set(None);
    }

    /// Whether `subject` may be dropped here.
    pub fn can_drop(&self, subject: &dyn DragSubject) -> bool {
        subject.kind() == self.accepts
    }

    /// A dragged subject is hovering this zone. Only acceptable subjects get
    /// the hover class and the `on_enter` hook.
    pub fn enter(&self, subject: &dyn DragSubject, host: &mut dyn ElementHost) {
        if !self.can_drop(subject) {
            return;
        }
        if let (Some(class), Some(element)) = (&self.drop_zone_class, self.element()) {
            host.add_class(element, class);
        }
        notify(&self.handlers.on_enter, subject);
    }

    /// A dragged subject stopped hovering this zone.
    pub fn leave(&self, subject: &dyn DragSubject, host: &mut dyn ElementHost) {
        if let (Some(class), Some(element)) = (&self.drop_zone_class, self.element()) {
            host.remove_class(element, class);
        }
        notify(&self.handlers.on_leave, subject);
    }

    /// Attempt to drop `subject` here. Returns `true` on acceptance.
    pub fn try_drop(&self, subject: &dyn DragSubject, host: &mut dyn ElementHost) -> bool {
        self.leave(subject, host);

        notify(&self.handlers.on_drop_attempt, subject);

        if !self.can_drop(subject) {
            log::debug!(
                "Dropzone {:?} rejected '{}' (accepts '{}')",
                self.element(),
                subject.kind(),
                self.accepts
            );
            notify(&self.handlers.on_failed_drop, subject);
            return false;
        }

        notify(&self.handlers.on_successful_drop, subject);
        true
    }
}

impl fmt::Debug for Dropzone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropzone")
            .field("accepts", &self.accepts)
            .field("element", &self.element.get())
            .field("drop_zone_class", &self.drop_zone_class)
            .finish_non_exhaustive()
    }
}
