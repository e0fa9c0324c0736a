//! Draggable state shared between a drag controller, the registry and
//! dropzones.

use crate::dropzone::Dropzone;
use crate::scene::ElementId;
use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Type-erased view of a draggable, as seen by dropzones and the registry.
pub trait DragSubject {
    /// Match key compared against a dropzone's `accepts`.
    fn kind(&self) -> &str;

    /// Element the draggable is bound to, once bound.
    fn element(&self) -> Option<ElementId>;

    fn is_dragging(&self) -> bool;

    /// The concrete draggable, for payload access via downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn DragSubject + 'a {
    /// Recover the typed draggable behind a subject.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&Draggable<T>> {
        self.as_any().downcast_ref::<Draggable<T>>()
    }
}

/// A drag source: its match key, bound element, payload and drag state.
///
/// Handles are shared as `Rc<Draggable<T>>`. All mutable state uses interior
/// mutability so the payload can be replaced while other components hold
/// the handle.
pub struct Draggable<T> {
    kind: String,
    element: Cell<Option<ElementId>>,
    /// Relation only: the registry owns dropzones.
    entered_dropzone: RefCell<Weak<Dropzone>>,
    item: RefCell<T>,
    is_dragging: Cell<bool>,
}

impl<T> Draggable<T> {
    /// Create an unbound draggable.
    pub fn new(kind: impl Into<String>, item: T) -> Self {
        Self {
            kind: kind.into(),
            element: Cell::new(None),
            entered_dropzone: RefCell::new(Weak::new()),
            item: RefCell::new(item),
            is_dragging: Cell::new(false),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element.get()
    }

    /// Bind the draggable to an element, returning the same element.
    pub fn bind(&self, element: ElementId) -> ElementId {
        self.element.set(Some(element));
        element
    }

    /// Forget the bound element.
    pub fn unbind(&self) {
        self.element.set(None);
    }

    /// Borrow the payload.
    ///
    /// # Panics
    /// Panics if the payload is currently borrowed mutably through
    /// [`Draggable::update_item`].
    pub fn item(&self) -> Ref<'_, T> {
        self.item.borrow()
    }

    /// Replace the payload, returning the previous one.
    pub fn set_item(&self, item: T) -> T {
        self.item.replace(item)
    }

    /// Modify the payload in place.
    pub fn update_item<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.item.borrow_mut())
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging.get()
    }

    pub(crate) fn set_dragging(&self, dragging: bool) {
        self.is_dragging.set(dragging);
    }

    /// Dropzone currently hovered during a drag, if it is still alive.
    pub fn entered_dropzone(&self) -> Option<Rc<Dropzone>> {
        self.entered_dropzone.borrow().upgrade()
    }

    pub(crate) fn set_entered_dropzone(&self, zone: Option<&Rc<Dropzone>>) {
        *self.entered_dropzone.borrow_mut() = zone.map(Rc::downgrade).unwrap_or_default();
    }
}

impl<T: Clone> Draggable<T> {
    /// Clone of the current payload.
    pub fn item_cloned(&self) -> T {
        self.item.borrow().clone()
    }
}

impl<T: 'static> DragSubject for Draggable<T> {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn element(&self) -> Option<ElementId> {
        self.element.get()
    }

    fn is_dragging(&self) -> bool {
        self.is_dragging.get()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for Draggable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draggable")
            .field("kind", &self.kind)
            .field("element", &self.element.get())
            .field("item", &self.item)
            .field("is_dragging", &self.is_dragging.get())
            .field("has_entered_dropzone", &self.entered_dropzone().is_some())
            .finish()
    }
}
