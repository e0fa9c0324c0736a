//! Event hub connecting pointer input, timers and mounted controllers.

use crate::drag::{DragController, DragDriver, DragKey, DragState, ReleaseOutcome};
use crate::dropzone::Dropzone;
use crate::input::{PointerEvent, PointerSignal, PointerTracker};
use crate::registry::Registry;
use crate::scene::{ElementHost, ElementId};
use crate::timer::TimerQueue;
use kurbo::Point;
use std::rc::Rc;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Owns the pointer streams and long-press timers for one UI session and
/// routes them to mounted drag controllers.
///
/// The host delivers pointer events with [`DragDropContext::handle_pointer_event`]
/// and calls [`DragDropContext::tick`] from its frame loop. Both fire any
/// long-press timer whose deadline has passed before doing anything else, so
/// drags start after real elapsed time even without a tick in between.
pub struct DragDropContext {
    registry: Rc<Registry>,
    pointer: PointerTracker,
    timers: TimerQueue<DragKey>,
    drivers: Vec<(DragKey, Box<dyn DragDriver>)>,
    next_key: u64,
    /// Controller that received the current press, until release.
    active: Option<DragKey>,
}

impl Default for DragDropContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DragDropContext {
    /// Create a context with its own registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::shared())
    }

    /// Create a context around an existing registry.
    pub fn with_registry(registry: Rc<Registry>) -> Self {
        Self {
            registry,
            pointer: PointerTracker::new(),
            timers: TimerQueue::new(),
            drivers: Vec::new(),
            next_key: 0,
            active: None,
        }
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    /// Mount a drag controller: registers its draggable and subscribes it to
    /// pointer and timer events.
    pub fn mount_draggable<T: 'static>(&mut self, controller: DragController<T>) -> DragKey {
        self.next_key += 1;
        let key = DragKey(self.next_key);
        controller.mount();
        self.drivers.push((key, Box::new(controller)));
        key
    }

    /// Unmount a drag controller, discarding any drag in progress without
    /// callbacks. Returns `false` for unknown keys.
    pub fn unmount_draggable(&mut self, key: DragKey, host: &mut dyn ElementHost) -> bool {
        let Some(index) = self.drivers.iter().position(|(k, _)| *k == key) else {
            return false;
        };
        let (_, mut driver) = self.drivers.remove(index);
        driver.unmount(host, &mut self.timers);
        if self.active == Some(key) {
            self.active = None;
        }
        true
    }

    pub fn mount_dropzone(&self, dropzone: Rc<Dropzone>) {
        self.registry.add_dropzone(dropzone);
    }

    pub fn unmount_dropzone(&self, dropzone: &Rc<Dropzone>) {
        self.registry.remove_dropzone(dropzone);
    }

    /// State of a mounted controller.
    pub fn drag_state(&self, key: DragKey) -> Option<DragState> {
        self.driver(key).map(|driver| driver.state())
    }

    /// Ghost element of a mounted controller, while it is dragging.
    pub fn ghost(&self, key: DragKey) -> Option<ElementId> {
        self.driver(key).and_then(|driver| driver.ghost())
    }

    /// Controller holding the current press, if any.
    pub fn active(&self) -> Option<DragKey> {
        self.active
    }

    /// Whether any controller is dragging right now.
    pub fn is_dragging(&self) -> bool {
        self.active
            .and_then(|key| self.drag_state(key))
            .is_some_and(|state| state == DragState::Dragging)
    }

    /// Earliest pending long-press deadline, for hosts that schedule wakeups.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn mounted_count(&self) -> usize {
        self.drivers.len()
    }

    /// Fire every long-press timer due at `now`.
    pub fn tick(&mut self, host: &mut dyn ElementHost, now: Instant) {
        for (timer, key) in self.timers.pop_due(now) {
            if let Some(driver) = self.driver_mut(key) {
                driver.fire(host, timer);
            }
        }
    }

    /// Feed one pointer event. Returns the outcome when a press ends.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        host: &mut dyn ElementHost,
        now: Instant,
    ) -> Option<ReleaseOutcome> {
        self.tick(host, now);

        let mut outcome = None;
        for signal in self.pointer.handle_pointer_event(event) {
            match signal {
                PointerSignal::Moved(position) => {
                    if let Some(key) = self.active {
                        if let Some(driver) = self.driver_mut(key) {
                            driver.pointer_moved(host, position);
                        }
                    }
                }
                PointerSignal::Pressed(position) => self.press(host, position, now),
                PointerSignal::Released(_) => {
                    if let Some(key) = self.active.take() {
                        outcome = self.release(key, host);
                    }
                }
            }
        }
        outcome
    }

    fn press(&mut self, host: &mut dyn ElementHost, position: Point, now: Instant) {
        if self.active.is_some() {
            return;
        }
        let Some(target) = host.element_at(position) else {
            return;
        };
        let Some(key) = self.innermost_draggable(&*host, target) else {
            return;
        };
        let Some(index) = self.drivers.iter().position(|(k, _)| *k == key) else {
            return;
        };
        let (key, driver) = &mut self.drivers[index];
        if driver.press(&*host, position, now, &mut self.timers, *key) {
            self.active = Some(*key);
        }
    }

    fn release(&mut self, key: DragKey, host: &mut dyn ElementHost) -> Option<ReleaseOutcome> {
        let index = self.drivers.iter().position(|(k, _)| *k == key)?;
        let (_, driver) = &mut self.drivers[index];
        Some(driver.release(host, &mut self.timers))
    }

    /// The mounted draggable whose element most tightly contains `target`.
    fn innermost_draggable(&self, host: &dyn ElementHost, target: ElementId) -> Option<DragKey> {
        let mut best: Option<(DragKey, ElementId)> = None;
        for (key, driver) in &self.drivers {
            let Some(element) = driver.element() else {
                continue;
            };
            if !host.contains(element, target) {
                continue;
            }
            match best {
                Some((_, current)) if !host.contains(current, element) => {}
                _ => best = Some((*key, element)),
            }
        }
        best.map(|(key, _)| key)
    }

    fn driver(&self, key: DragKey) -> Option<&dyn DragDriver> {
        self.drivers
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, driver)| &**driver)
    }

    fn driver_mut(&mut self, key: DragKey) -> Option<&mut Box<dyn DragDriver>> {
        self.drivers
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, driver)| driver)
    }
}

impl std::fmt::Debug for DragDropContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragDropContext")
            .field("registry", &self.registry)
            .field("mounted", &self.drivers.len())
            .field("pending_timers", &self.timers.len())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::{DragHandlers, DropOutcome};
    use crate::draggable::Draggable;
    use crate::dropzone::DropHandlers;
    use crate::options::{DragOptions, DropOptions};
    use crate::scene::MemoryScene;
    use kurbo::Rect;
    use std::cell::RefCell;
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        enter: u32,
        drag_attempt: u32,
        drag_success: u32,
        drag_failed: u32,
        zone_attempt: u32,
        zone_success: u32,
        zone_failed: u32,
    }

    struct Harness {
        ctx: DragDropContext,
        scene: MemoryScene,
        counters: Rc<RefCell<Counters>>,
        key: DragKey,
        draggable: Rc<Draggable<&'static str>>,
        source: ElementId,
        zone_el: ElementId,
        start: Instant,
    }

    impl Harness {
        /// Draggable at (0,0)-(40,40), dropzone at (40,40)-(80,80).
        fn new(kind: &str, accepts: &str, delay_ms: u64) -> Self {
            let mut scene = MemoryScene::new();
            let source = scene.create_element(Rect::new(0.0, 0.0, 40.0, 40.0));
            let zone_el = scene.create_element(Rect::new(40.0, 40.0, 80.0, 80.0));
            let mut ctx = DragDropContext::new();
            let counters = Rc::new(RefCell::new(Counters::default()));

            let (a, s, f) = (counters.clone(), counters.clone(), counters.clone());
            let controller = DragController::new(
                DragOptions::new(kind)
                    .with_start_delay(Duration::from_millis(delay_ms))
                    .with_dragging_class("dragging")
                    .with_dragging_clone_class("ghost"),
                "payload",
                DragHandlers::new()
                    .on_drop_attempt(move |_| a.borrow_mut().drag_attempt += 1)
                    .on_successful_drop(move |_| s.borrow_mut().drag_success += 1)
                    .on_failed_drop(move |_| f.borrow_mut().drag_failed += 1),
                ctx.registry().clone(),
            );
            controller.bind(source);
            let draggable = controller.draggable().clone();
            let key = ctx.mount_draggable(controller);

            let (e, a, s, f) = (counters.clone(), counters.clone(), counters.clone(), counters.clone());
            let zone = Rc::new(Dropzone::new(
                DropOptions::new(accepts).with_drop_zone_class("hover"),
                DropHandlers::new()
                    .on_enter(move |_| e.borrow_mut().enter += 1)
                    .on_drop_attempt(move |_| a.borrow_mut().zone_attempt += 1)
                    .on_successful_drop(move |_| s.borrow_mut().zone_success += 1)
                    .on_failed_drop(move |_| f.borrow_mut().zone_failed += 1),
            ));
            zone.bind(zone_el);
            ctx.mount_dropzone(zone);

            Self {
                ctx,
                scene,
                counters,
                key,
                draggable,
                source,
                zone_el,
                start: Instant::now(),
            }
        }

        fn at(&self, ms: u64) -> Instant {
            self.start + Duration::from_millis(ms)
        }

        fn send(&mut self, event: PointerEvent, ms: u64) -> Option<ReleaseOutcome> {
            let now = self.at(ms);
            self.ctx.handle_pointer_event(event, &mut self.scene, now)
        }
    }

    #[test]
    fn test_crate_scenario() {
        let mut h = Harness::new("crate", "crate", 0);

        h.send(PointerEvent::down(Point::new(10.0, 10.0)), 0);
        let now = h.at(1);
        h.ctx.tick(&mut h.scene, now);
        assert_eq!(h.ctx.drag_state(h.key), Some(DragState::Dragging));
        let ghost = h.ctx.ghost(h.key).unwrap();

        h.send(PointerEvent::moved(Point::new(50.0, 50.0)), 2);
        assert!(h.scene.has_class(h.zone_el, "hover"));
        assert!(h.scene.ghost_style(ghost).unwrap().visible);

        let outcome = h.send(PointerEvent::up(Point::new(50.0, 50.0)), 3);

        assert_eq!(outcome, Some(ReleaseOutcome::Dropped(DropOutcome::Accepted)));
        let c = h.counters.borrow();
        assert_eq!(c.enter, 1);
        assert_eq!(c.drag_success, 1);
        assert_eq!(c.zone_success, 1);
        assert_eq!(c.drag_failed + c.zone_failed, 0);
        assert!(!h.scene.exists(ghost));
        assert!(h.scene.ghosts().is_empty());
        assert!(!h.ctx.pointer().is_pressed());
        assert_eq!(h.ctx.pointer().position(), Point::new(50.0, 50.0));
        assert!(!h.draggable.is_dragging());
        assert!(!h.scene.has_class(h.zone_el, "hover"));
        assert!(h.draggable.entered_dropzone().is_none());
    }

    #[test]
    fn test_release_before_delay_has_no_side_effects() {
        let mut h = Harness::new("crate", "crate", 100);
        let elements = h.scene.element_count();

        h.send(PointerEvent::down(Point::new(10.0, 10.0)), 0);
        h.send(PointerEvent::moved(Point::new(50.0, 50.0)), 30);
        let outcome = h.send(PointerEvent::up(Point::new(50.0, 50.0)), 50);

        assert_eq!(outcome, Some(ReleaseOutcome::Cancelled));
        assert_eq!(h.scene.element_count(), elements);
        assert!(h.scene.classes(h.source).is_empty());
        assert!(h.scene.classes(h.zone_el).is_empty());
        assert!(!h.draggable.is_dragging());
        assert_eq!(h.counters.borrow().drag_attempt, 0);
        assert!(h.ctx.next_deadline().is_none());

        // The cancelled timer never fires later
        let later = h.at(500);
        h.ctx.tick(&mut h.scene, later);
        assert_eq!(h.ctx.drag_state(h.key), Some(DragState::Idle));
    }

    #[test]
    fn test_elapsed_delay_starts_drag_without_tick() {
        let mut h = Harness::new("crate", "crate", 100);

        h.send(PointerEvent::down(Point::new(10.0, 10.0)), 0);
        h.send(PointerEvent::moved(Point::new(12.0, 12.0)), 150);

        assert!(h.ctx.is_dragging());
        let ghost = h.ctx.ghost(h.key).unwrap();
        let style = h.scene.ghost_style(ghost).unwrap();
        assert!(style.visible);
        assert_eq!(style.origin, Point::new(2.0, 2.0));
        assert!(h.scene.has_class(h.source, "dragging"));
        assert!(h.scene.has_class(ghost, "ghost"));
    }

    #[test]
    fn test_mismatched_dropzone_fails_on_both_sides() {
        let mut h = Harness::new("crate", "barrel", 0);

        h.send(PointerEvent::down(Point::new(10.0, 10.0)), 0);
        h.send(PointerEvent::moved(Point::new(50.0, 50.0)), 1);
        assert!(!h.scene.has_class(h.zone_el, "hover"));

        let outcome = h.send(PointerEvent::up(Point::new(50.0, 50.0)), 2);

        assert_eq!(outcome, Some(ReleaseOutcome::Dropped(DropOutcome::Rejected)));
        let c = h.counters.borrow();
        assert_eq!(c.drag_failed, 1);
        assert_eq!(c.zone_failed, 1);
        assert_eq!(c.drag_success + c.zone_success, 0);
        assert!(h.draggable.entered_dropzone().is_none());
    }

    #[test]
    fn test_release_off_dropzone_never_calls_drop() {
        let mut h = Harness::new("crate", "crate", 0);

        h.send(PointerEvent::down(Point::new(10.0, 10.0)), 0);
        h.send(PointerEvent::moved(Point::new(50.0, 50.0)), 1);
        h.send(PointerEvent::moved(Point::new(200.0, 200.0)), 2);
        let outcome = h.send(PointerEvent::up(Point::new(200.0, 200.0)), 3);

        assert_eq!(outcome, Some(ReleaseOutcome::Dropped(DropOutcome::NoTarget)));
        let c = h.counters.borrow();
        assert_eq!(c.drag_failed, 1);
        assert_eq!(c.zone_attempt, 0);
        assert_eq!(c.zone_failed, 0);
        assert!(h.scene.ghosts().is_empty());
    }

    #[test]
    fn test_rejected_start_has_no_side_effects() {
        let mut scene = MemoryScene::new();
        let source = scene.create_element(Rect::new(0.0, 0.0, 40.0, 40.0));
        let mut ctx = DragDropContext::new();
        let controller = DragController::new(
            DragOptions::new("crate").with_start_delay(Duration::ZERO).with_dragging_class("dragging"),
            (),
            DragHandlers::new().on_drag_start(|_| false),
            ctx.registry().clone(),
        );
        controller.bind(source);
        let key = ctx.mount_draggable(controller);
        let start = Instant::now();
        let elements = scene.element_count();

        ctx.handle_pointer_event(PointerEvent::down(Point::new(5.0, 5.0)), &mut scene, start);
        ctx.handle_pointer_event(PointerEvent::moved(Point::new(6.0, 6.0)), &mut scene, start + Duration::from_secs(1));
        let outcome = ctx.handle_pointer_event(PointerEvent::up(Point::new(6.0, 6.0)), &mut scene, start + Duration::from_secs(2));

        assert_eq!(outcome, Some(ReleaseOutcome::Cancelled));
        assert_eq!(scene.element_count(), elements);
        assert!(scene.classes(source).is_empty());
        assert_eq!(ctx.drag_state(key), Some(DragState::Idle));
    }

    #[test]
    fn test_press_outside_draggables_is_ignored() {
        let mut h = Harness::new("crate", "crate", 0);

        h.send(PointerEvent::down(Point::new(60.0, 60.0)), 0);
        let now = h.at(10);
        h.ctx.tick(&mut h.scene, now);

        assert!(h.ctx.active().is_none());
        assert_eq!(h.send(PointerEvent::up(Point::new(60.0, 60.0)), 20), None);
    }

    #[test]
    fn test_nested_draggables_press_innermost() {
        let mut scene = MemoryScene::new();
        let outer_el = scene.create_element(Rect::new(0.0, 0.0, 100.0, 100.0));
        let inner_el = scene.create_child(outer_el, Rect::new(10.0, 10.0, 50.0, 50.0)).unwrap();
        let mut ctx = DragDropContext::new();
        let outer = DragController::new(DragOptions::new("bag"), (), DragHandlers::new(), ctx.registry().clone());
        outer.bind(outer_el);
        let inner = DragController::new(DragOptions::new("gem"), (), DragHandlers::new(), ctx.registry().clone());
        inner.bind(inner_el);
        let outer_key = ctx.mount_draggable(outer);
        let inner_key = ctx.mount_draggable(inner);

        ctx.handle_pointer_event(PointerEvent::down(Point::new(20.0, 20.0)), &mut scene, Instant::now());

        assert_eq!(ctx.active(), Some(inner_key));
        assert_eq!(ctx.drag_state(outer_key), Some(DragState::Idle));
        assert_eq!(ctx.registry().draggable_count(), 2);
    }

    #[test]
    fn test_unmount_during_drag() {
        let mut h = Harness::new("crate", "crate", 0);

        h.send(PointerEvent::down(Point::new(10.0, 10.0)), 0);
        h.send(PointerEvent::moved(Point::new(50.0, 50.0)), 1);
        assert!(h.scene.has_class(h.zone_el, "hover"));

        assert!(h.ctx.unmount_draggable(h.key, &mut h.scene));
        assert!(!h.ctx.unmount_draggable(h.key, &mut h.scene));

        assert!(h.scene.ghosts().is_empty());
        assert!(!h.scene.has_class(h.zone_el, "hover"));
        assert!(h.ctx.active().is_none());
        assert_eq!(h.ctx.registry().draggable_count(), 0);
        assert_eq!(h.send(PointerEvent::up(Point::new(50.0, 50.0)), 2), None);
        assert_eq!(h.counters.borrow().drag_failed, 0);
    }

    #[test]
    fn test_repeated_drags_leave_nothing_behind() {
        let mut h = Harness::new("crate", "crate", 0);
        let elements = h.scene.element_count();

        for round in 0..5 {
            let t = round * 10;
            h.send(PointerEvent::down(Point::new(10.0, 10.0)), t);
            h.send(PointerEvent::moved(Point::new(50.0, 50.0)), t + 1);
            h.send(PointerEvent::up(Point::new(50.0, 50.0)), t + 2);
        }

        assert_eq!(h.scene.element_count(), elements);
        assert_eq!(h.counters.borrow().drag_success, 5);
        assert!(h.ctx.next_deadline().is_none());
    }
}
