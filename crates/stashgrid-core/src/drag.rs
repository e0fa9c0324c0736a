//! Drag controller: the long-press → clone → track → drop state machine.

use crate::draggable::{DragSubject, Draggable};
use crate::ghost::{Ghost, Grip};
use crate::options::DragOptions;
use crate::registry::Registry;
use crate::scene::{ElementHost, ElementId};
use crate::timer::{TimerId, TimerQueue};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use std::rc::Rc;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Key of a drag controller mounted in a [`crate::DragDropContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DragKey(pub(crate) u64);

/// Callback invoked with the draggable being dragged.
pub type DragCallback<T> = Box<dyn Fn(&Draggable<T>)>;

/// Predicate over a draggable, used by drag-start decisions.
pub type DragPredicate<T> = Box<dyn Fn(&Draggable<T>) -> bool>;

/// Optional drag callbacks. Absent handlers are no-ops.
pub struct DragHandlers<T> {
    on_drag_start: Option<DragPredicate<T>>,
    prevent_when: Vec<DragPredicate<T>>,
    on_drop_attempt: Option<DragCallback<T>>,
    on_failed_drop: Option<DragCallback<T>>,
    on_successful_drop: Option<DragCallback<T>>,
}

impl<T> Default for DragHandlers<T> {
    fn default() -> Self {
        Self {
            on_drag_start: None,
            prevent_when: Vec::new(),
            on_drop_attempt: None,
            on_failed_drop: None,
            on_successful_drop: None,
        }
    }
}

impl<T> DragHandlers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when the long press completes. Returning `false` aborts the
    /// drag before any clone is created.
    pub fn on_drag_start(mut self, f: impl Fn(&Draggable<T>) -> bool + 'static) -> Self {
        self.on_drag_start = Some(Box::new(f));
        self
    }

    /// Add a condition that silently prevents the drag from starting.
    /// Conditions are checked before `on_drag_start`.
    pub fn prevent_when(mut self, condition: impl Fn(&Draggable<T>) -> bool + 'static) -> Self {
        self.prevent_when.push(Box::new(condition));
        self
    }

    pub fn on_drop_attempt(mut self, f: impl Fn(&Draggable<T>) + 'static) -> Self {
        self.on_drop_attempt = Some(Box::new(f));
        self
    }

    pub fn on_failed_drop(mut self, f: impl Fn(&Draggable<T>) + 'static) -> Self {
        self.on_failed_drop = Some(Box::new(f));
        self
    }

    pub fn on_successful_drop(mut self, f: impl Fn(&Draggable<T>) + 'static) -> Self {
        self.on_successful_drop = Some(Box::new(f));
        self
    }

    fn allows_start(&self, draggable: &Draggable<T>) -> bool {
        if self.prevent_when.iter().any(|condition| condition(draggable)) {
            return false;
        }
        self.on_drag_start.as_ref().is_none_or(|f| f(draggable))
    }
}

fn notify<T>(handler: &Option<DragCallback<T>>, draggable: &Draggable<T>) {
    if let Some(handler) = handler {
        handler(draggable);
    }
}

/// Public view of a controller's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragState {
    Idle,
    /// Pointer is down and the long-press timer is armed.
    Pending,
    Dragging,
}

/// How a completed drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropOutcome {
    /// The entered dropzone accepted the draggable.
    Accepted,
    /// The entered dropzone refused the draggable.
    Rejected,
    /// Released away from any dropzone.
    NoTarget,
}

/// Result of a pointer release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseOutcome {
    /// Released before the drag started; nothing happened.
    Cancelled,
    Dropped(DropOutcome),
}

#[derive(Debug)]
enum DragPhase {
    Idle,
    Pending { timer: TimerId, grip: Grip },
    Dragging { ghost: Ghost },
}

/// Drives one draggable through press, long press, tracking and release.
pub struct DragController<T> {
    draggable: Rc<Draggable<T>>,
    options: DragOptions,
    handlers: DragHandlers<T>,
    registry: Rc<Registry>,
    phase: DragPhase,
}

impl<T: 'static> DragController<T> {
    /// Create a controller for a new draggable carrying `item`.
    pub fn new(options: DragOptions, item: T, handlers: DragHandlers<T>, registry: Rc<Registry>) -> Self {
        let draggable = Rc::new(Draggable::new(options.kind.clone(), item));
        Self {
            draggable,
            options,
            handlers,
            registry,
            phase: DragPhase::Idle,
        }
    }

    /// Shared handle to the draggable state.
    pub fn draggable(&self) -> &Rc<Draggable<T>> {
        &self.draggable
    }

    pub fn options(&self) -> &DragOptions {
        &self.options
    }

    /// Bind to an element, returning the same element so it can also be
    /// bound as a dropzone.
    pub fn bind(&self, element: ElementId) -> ElementId {
        self.draggable.bind(element)
    }

    pub fn state(&self) -> DragState {
        match self.phase {
            DragPhase::Idle => DragState::Idle,
            DragPhase::Pending { .. } => DragState::Pending,
            DragPhase::Dragging { .. } => DragState::Dragging,
        }
    }

    /// Element of the live ghost, while dragging.
    pub fn ghost(&self) -> Option<ElementId> {
        match &self.phase {
            DragPhase::Dragging { ghost } => Some(ghost.element()),
            _ => None,
        }
    }

    /// Register the draggable in the registry.
    pub fn mount(&self) {
        self.registry.add_draggable(self.draggable.clone());
    }

    /// Pointer went down on the bound element. Arms the long-press timer.
    ///
    /// Returns `false` if the controller is busy, unbound, or the host cannot
    /// measure the pressed element.
    pub fn press(
        &mut self,
        host: &dyn ElementHost,
        pointer: Point,
        now: Instant,
        timers: &mut TimerQueue<DragKey>,
        key: DragKey,
    ) -> bool {
        if !matches!(self.phase, DragPhase::Idle) {
            return false;
        }
        let Some(source) = self.draggable.element() else {
            return false;
        };
        let grip = match Grip::capture(host, source, pointer) {
            Ok(grip) => grip,
            Err(err) => {
                log::warn!("Cannot start drag of '{}': {}", self.options.kind, err);
                return false;
            }
        };

        let timer = timers.schedule(now + self.options.start_delay(), key);
        log::debug!(
            "Drag '{}' pending, start in {}ms",
            self.options.kind,
            self.options.start_delay_ms
        );
        self.phase = DragPhase::Pending { timer, grip };
        true
    }

    /// The long-press timer fired. Returns `true` if the drag started.
    pub fn fire(&mut self, host: &mut dyn ElementHost, timer: TimerId) -> bool {
        let grip = match self.phase {
            DragPhase::Pending { timer: armed, grip } if armed == timer => grip,
            _ => return false,
        };
        self.phase = DragPhase::Idle;

        if !self.handlers.allows_start(&self.draggable) {
            log::debug!("Drag '{}' prevented at start", self.options.kind);
            return false;
        }

        self.draggable.set_dragging(true);
        if let (Some(class), Some(element)) = (&self.options.dragging_class, self.draggable.element()) {
            host.add_class(element, class);
        }

        match Ghost::spawn(host, grip, self.options.dragging_clone_class.as_deref()) {
            Ok(ghost) => {
                log::debug!("Drag '{}' started", self.options.kind);
                self.phase = DragPhase::Dragging { ghost };
                true
            }
            Err(err) => {
                log::warn!("Drag '{}' aborted, cannot create clone: {}", self.options.kind, err);
                self.draggable.set_dragging(false);
                self.remove_dragging_class(host);
                false
            }
        }
    }

    /// Pointer moved. Repositions the ghost and resolves the hovered dropzone.
    pub fn pointer_moved(&mut self, host: &mut dyn ElementHost, pointer: Point) {
        let DragPhase::Dragging { ghost } = &mut self.phase else {
            return;
        };
        if !self.draggable.is_dragging() {
            return;
        }
        if let Err(err) = ghost.follow(host, pointer) {
            log::warn!("Cannot move drag clone: {}", err);
        }
        self.resolve_hover(host, pointer);
    }

    fn resolve_hover(&self, host: &mut dyn ElementHost, pointer: Point) {
        let found = host
            .element_at(pointer)
            .and_then(|hovered| self.registry.find_dropzone(|zone| zone.element() == Some(hovered)));
        let previous = self.draggable.entered_dropzone();
        let changed = match (&previous, &found) {
            (Some(previous), Some(found)) => !Rc::ptr_eq(previous, found),
            (None, None) => false,
            _ => true,
        };
        let subject: &dyn DragSubject = &*self.draggable;

        if changed {
            log::trace!(
                "Drag '{}' hover {:?} -> {:?}",
                self.options.kind,
                previous.as_ref().and_then(|zone| zone.element()),
                found.as_ref().and_then(|zone| zone.element())
            );
            if let Some(previous) = &previous {
                previous.leave(subject, host);
            }
        }

        self.draggable.set_entered_dropzone(found.as_ref());

        if let Some(found) = &found {
            found.enter(subject, host);
        }
    }

    /// Pointer released. Ends a pending press silently or completes a drag.
    pub fn release(&mut self, host: &mut dyn ElementHost, timers: &mut TimerQueue<DragKey>) -> ReleaseOutcome {
        match mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => {}
            DragPhase::Pending { timer, .. } => {
                timers.cancel(timer);
                log::debug!("Drag '{}' cancelled before start", self.options.kind);
            }
            DragPhase::Dragging { ghost } => ghost.remove(host),
        }

        if !self.draggable.is_dragging() {
            return ReleaseOutcome::Cancelled;
        }

        self.draggable.set_dragging(false);
        self.remove_dragging_class(host);
        notify(&self.handlers.on_drop_attempt, &*self.draggable);

        let Some(zone) = self.draggable.entered_dropzone() else {
            notify(&self.handlers.on_failed_drop, &*self.draggable);
            log::debug!("Drag '{}' released outside any dropzone", self.options.kind);
            return ReleaseOutcome::Dropped(DropOutcome::NoTarget);
        };

        let subject: &dyn DragSubject = &*self.draggable;
        let outcome = if zone.try_drop(subject, host) {
            notify(&self.handlers.on_successful_drop, &*self.draggable);
            DropOutcome::Accepted
        } else {
            notify(&self.handlers.on_failed_drop, &*self.draggable);
            DropOutcome::Rejected
        };
        self.draggable.set_entered_dropzone(None);

        log::debug!("Drag '{}' dropped: {:?}", self.options.kind, outcome);
        ReleaseOutcome::Dropped(outcome)
    }

    /// Unwind everything without firing callbacks and leave the registry.
    pub fn unmount(&mut self, host: &mut dyn ElementHost, timers: &mut TimerQueue<DragKey>) {
        match mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => {}
            DragPhase::Pending { timer, .. } => {
                timers.cancel(timer);
            }
            DragPhase::Dragging { ghost } => ghost.remove(host),
        }

        if self.draggable.is_dragging() {
            self.draggable.set_dragging(false);
            self.remove_dragging_class(host);
            if let Some(zone) = self.draggable.entered_dropzone() {
                zone.leave(&*self.draggable, host);
            }
            self.draggable.set_entered_dropzone(None);
        }

        self.registry.remove_draggable(&self.draggable);
    }

    fn remove_dragging_class(&self, host: &mut dyn ElementHost) {
        if let (Some(class), Some(element)) = (&self.options.dragging_class, self.draggable.element()) {
            host.remove_class(element, class);
        }
    }
}

impl<T> fmt::Debug for DragController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragController")
            .field("options", &self.options)
            .field("element", &self.draggable.element())
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Type-erased controller interface used by the context.
pub(crate) trait DragDriver {
    fn element(&self) -> Option<ElementId>;
    fn state(&self) -> DragState;
    fn ghost(&self) -> Option<ElementId>;
    fn mount(&self);
    fn press(
        &mut self,
        host: &dyn ElementHost,
        pointer: Point,
        now: Instant,
        timers: &mut TimerQueue<DragKey>,
        key: DragKey,
    ) -> bool;
    fn fire(&mut self, host: &mut dyn ElementHost, timer: TimerId) -> bool;
    fn pointer_moved(&mut self, host: &mut dyn ElementHost, pointer: Point);
    fn release(&mut self, host: &mut dyn ElementHost, timers: &mut TimerQueue<DragKey>) -> ReleaseOutcome;
    fn unmount(&mut self, host: &mut dyn ElementHost, timers: &mut TimerQueue<DragKey>);
}

impl<T: 'static> DragDriver for DragController<T> {
    fn element(&self) -> Option<ElementId> {
        self.draggable.element()
    }

    fn state(&self) -> DragState {
        DragController::state(self)
    }

    fn ghost(&self) -> Option<ElementId> {
        DragController::ghost(self)
    }

    fn mount(&self) {
        DragController::mount(self)
    }

    fn press(
        &mut self,
        host: &dyn ElementHost,
        pointer: Point,
        now: Instant,
        timers: &mut TimerQueue<DragKey>,
        key: DragKey,
    ) -> bool {
        DragController::press(self, host, pointer, now, timers, key)
    }

    fn fire(&mut self, host: &mut dyn ElementHost, timer: TimerId) -> bool {
        DragController::fire(self, host, timer)
    }

    fn pointer_moved(&mut self, host: &mut dyn ElementHost, pointer: Point) {
        DragController::pointer_moved(self, host, pointer)
    }

    fn release(&mut self, host: &mut dyn ElementHost, timers: &mut TimerQueue<DragKey>) -> ReleaseOutcome {
        DragController::release(self, host, timers)
    }

    fn unmount(&mut self, host: &mut dyn ElementHost, timers: &mut TimerQueue<DragKey>) {
        DragController::unmount(self, host, timers)
    }
}
