//! Cancellable deadline queue for long-press timers.

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct PendingTimer<K> {
    id: TimerId,
    deadline: Instant,
    owner: K,
}

/// Timers keyed by an owner, fired by polling with the current time.
///
/// The queue never sleeps or spawns anything: the host calls
/// [`TimerQueue::pop_due`] with the current instant and receives every timer
/// whose deadline has passed, earliest first.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    next_id: u64,
    pending: Vec<PendingTimer<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<K: Copy> TimerQueue<K> {
    /// Create an empty timer queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer for `owner` at `deadline`.
    pub fn schedule(&mut self, deadline: Instant, owner: K) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push(PendingTimer { id, deadline, owner });
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        self.pending.len() != before
    }

    /// Check whether a timer is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    /// Remove and return every timer due at `now`, earliest deadline first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<(TimerId, K)> {
        let mut due: Vec<PendingTimer<K>> = Vec::new();
        self.pending.retain(|timer| {
            if timer.deadline <= now {
                due.push(timer.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|timer| (timer.deadline, timer.id));
        due.into_iter().map(|timer| (timer.id, timer.owner)).collect()
    }

    /// Earliest pending deadline, useful for hosts that schedule wakeups.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|timer| timer.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
