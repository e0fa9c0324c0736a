//! Pointer position sampling and pressed-state detection.
//!
//! Raw pointer events are folded into a [`PointerTracker`], which reports
//! the changes drag controllers subscribe to as [`PointerSignal`]s.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
}

impl PointerEvent {
    /// Primary-button press at `position`.
    pub fn down(position: Point) -> Self {
        Self::Down {
            position,
            button: MouseButton::Left,
        }
    }

    /// Primary-button release at `position`.
    pub fn up(position: Point) -> Self {
        Self::Up {
            position,
            button: MouseButton::Left,
        }
    }

    pub fn moved(position: Point) -> Self {
        Self::Move { position }
    }

    pub fn position(&self) -> Point {
        match *self {
            Self::Down { position, .. } | Self::Up { position, .. } | Self::Move { position } => {
                position
            }
        }
    }
}

/// A change observed on the pointer streams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSignal {
    /// Pointer position changed.
    Moved(Point),
    /// Primary button went down.
    Pressed(Point),
    /// Primary button went up.
    Released(Point),
}

/// The button that drives drag gestures.
pub const PRIMARY_BUTTON: MouseButton = MouseButton::Left;

/// Tracks pointer position and pressed state across events.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    /// Current pointer position in screen coordinates.
    position: Point,
    /// Currently pressed mouse buttons.
    pressed_buttons: HashSet<MouseButton>,
}

impl PointerTracker {
    /// Create a new pointer tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event and return the resulting signals in order.
    ///
    /// A press or release at a new position reports the move first, so
    /// subscribers always see the pointer where the button changed.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Vec<PointerSignal> {
        let mut signals = Vec::new();
        let position = event.position();
        if position != self.position {
            self.position = position;
            signals.push(PointerSignal::Moved(position));
        }

        match event {
            PointerEvent::Down { button, .. } => {
                if self.pressed_buttons.insert(button) && button == PRIMARY_BUTTON {
                    signals.push(PointerSignal::Pressed(position));
                }
            }
            PointerEvent::Up { button, .. } => {
                if self.pressed_buttons.remove(&button) && button == PRIMARY_BUTTON {
                    signals.push(PointerSignal::Released(position));
                }
            }
            PointerEvent::Move { .. } => {}
        }

        signals
    }

    /// Last known pointer position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Check if the primary button is held.
    pub fn is_pressed(&self) -> bool {
        self.is_button_pressed(PRIMARY_BUTTON)
    }

    /// Check if a button is currently pressed.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }
}
