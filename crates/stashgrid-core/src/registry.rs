//! Registry of mounted draggables and dropzones.

use crate::draggable::DragSubject;
use crate::dropzone::Dropzone;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identity comparison between handles, ignoring trait-object metadata.
fn same_handle<A: ?Sized, B: ?Sized>(a: &Rc<A>, b: &Rc<B>) -> bool {
    std::ptr::eq(Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>())
}

/// Shared collections of the handles currently mounted in a session.
///
/// Membership is by handle identity: two dropzones with the same `accepts`
/// are distinct entries, and adding the same handle twice is a no-op.
/// Borrows are scoped to each call, so callbacks fired while resolving a
/// drag may mount or unmount handles. Holding a view returned by
/// [`Registry::draggables`] or [`Registry::dropzones`] across such a call
/// will panic.
#[derive(Default)]
pub struct Registry {
    draggables: RefCell<Vec<Rc<dyn DragSubject>>>,
    dropzones: RefCell<Vec<Rc<Dropzone>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry ready to be shared between controllers.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Register a draggable.
    pub fn add_draggable(&self, draggable: Rc<dyn DragSubject>) {
        let mut draggables = self.draggables.borrow_mut();
        if !draggables.iter().any(|d| same_handle(d, &draggable)) {
            draggables.push(draggable);
        }
    }

    /// Deregister a draggable. Absent handles are ignored.
    pub fn remove_draggable<D: DragSubject + ?Sized>(&self, draggable: &Rc<D>) {
        self.draggables
            .borrow_mut()
            .retain(|d| !same_handle(d, draggable));
    }

    /// Register a dropzone.
    pub fn add_dropzone(&self, dropzone: Rc<Dropzone>) {
        let mut dropzones = self.dropzones.borrow_mut();
        if !dropzones.iter().any(|z| Rc::ptr_eq(z, &dropzone)) {
            dropzones.push(dropzone);
        }
    }

    /// Deregister a dropzone. Absent handles are ignored.
    pub fn remove_dropzone(&self, dropzone: &Rc<Dropzone>) {
        self.dropzones
            .borrow_mut()
            .retain(|z| !Rc::ptr_eq(z, dropzone));
    }

    /// First dropzone, in mount order, satisfying `predicate`.
    pub fn find_dropzone(&self, mut predicate: impl FnMut(&Dropzone) -> bool) -> Option<Rc<Dropzone>> {
        self.dropzones
            .borrow()
            .iter()
            .find(|zone| predicate(zone))
            .cloned()
    }

    /// Whether this exact draggable handle is registered.
    pub fn contains_draggable<D: DragSubject + ?Sized>(&self, draggable: &Rc<D>) -> bool {
        self.draggables
            .borrow()
            .iter()
            .any(|d| same_handle(d, draggable))
    }

    /// Whether this exact dropzone handle is registered.
    pub fn contains_dropzone(&self, dropzone: &Rc<Dropzone>) -> bool {
        self.dropzones
            .borrow()
            .iter()
            .any(|z| Rc::ptr_eq(z, dropzone))
    }

    /// Read-only view of the mounted draggables.
    pub fn draggables(&self) -> Ref<'_, [Rc<dyn DragSubject>]> {
        Ref::map(self.draggables.borrow(), Vec::as_slice)
    }

    /// Read-only view of the mounted dropzones.
    pub fn dropzones(&self) -> Ref<'_, [Rc<Dropzone>]> {
        Ref::map(self.dropzones.borrow(), Vec::as_slice)
    }

    /// Number of registered draggables.
    pub fn draggable_count(&self) -> usize {
        self.draggables.borrow().len()
    }

    /// Number of registered dropzones.
    pub fn dropzone_count(&self) -> usize {
        self.dropzones.borrow().len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("draggables", &self.draggable_count())
            .field("dropzones", &self.dropzones.borrow())
            .finish()
    }
}
