//! Scripted pointer sessions replayed against a board.

use crate::board::InventoryBoard;
use kurbo::Point;
use stashgrid_core::{PointerEvent, ReleaseOutcome};
use std::time::{Duration, Instant};

/// One step of a pointer session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Press the primary button at a point.
    Press(Point),
    /// Let time pass, firing any due long-press timer.
    Wait(Duration),
    MoveTo(Point),
    /// Release the primary button where the pointer is.
    Release,
}

/// A sequence of steps with its own clock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(mut self, at: Point) -> Self {
        self.steps.push(Step::Press(at));
        self
    }

    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Wait(duration));
        self
    }

    pub fn move_to(mut self, to: Point) -> Self {
        self.steps.push(Step::MoveTo(to));
        self
    }

    pub fn release(mut self) -> Self {
        self.steps.push(Step::Release);
        self
    }

    /// Press at `from`, hold for `hold`, move to `to` and release.
    pub fn drag(self, from: Point, to: Point, hold: Duration) -> Self {
        self.press(from).wait(hold).move_to(to).release()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Replay the steps starting at `start`. Returns one outcome per release
    /// that ended a press.
    pub fn run(&self, board: &mut InventoryBoard, start: Instant) -> Vec<ReleaseOutcome> {
        let mut now = start;
        let mut pointer = Point::ZERO;
        let mut outcomes = Vec::new();

        for step in &self.steps {
            let event = match *step {
                Step::Press(at) => {
                    pointer = at;
                    PointerEvent::down(at)
                }
                Step::Wait(duration) => {
                    now += duration;
                    board.tick(now);
                    continue;
                }
                Step::MoveTo(to) => {
                    pointer = to;
                    PointerEvent::moved(to)
                }
                Step::Release => PointerEvent::up(pointer),
            };
            if let Some(outcome) = board.handle(event, now) {
                log::debug!("Release at {:?}: {:?}", pointer, outcome);
                outcomes.push(outcome);
            }
        }
        outcomes
    }
}
