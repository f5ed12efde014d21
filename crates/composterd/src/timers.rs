//! Auto-idle event queue.
//!
//! When the controller activates an actuator it schedules a `(fire_at,
//! actuator)` event here; the driver drains due events at the top of every
//! tick and returns the actuator to idle. Keeping the pending events as plain
//! data inside the shared state — instead of detached sleep tasks — means a
//! manual toggle and an auto-deactivation can never race on the same
//! actuator, and cancellation is an ordinary, inspectable operation.

use std::time::Instant;

use crate::state::Actuator;

#[derive(Debug, Clone, Copy)]
pub struct PendingIdle {
    pub fire_at: Instant,
    pub actuator: Actuator,
}

/// Pending auto-idle events, kept ordered by fire time.
#[derive(Debug, Default)]
pub struct AutoIdleQueue {
    pending: Vec<PendingIdle>,
}

impl AutoIdleQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Schedule `actuator` to go idle at `fire_at`.
    pub fn schedule(&mut self, actuator: Actuator, fire_at: Instant) {
        let pos = self.pending.partition_point(|p| p.fire_at <= fire_at);
        self.pending.insert(pos, PendingIdle { fire_at, actuator });
    }

    /// Drain every event due at `now` and return its actuator, earliest
    /// first. Events in the future are untouched.
    pub fn due(&mut self, now: Instant) -> Vec<Actuator> {
        let n = self.pending.partition_point(|p| p.fire_at <= now);
        self.pending.drain(..n).map(|p| p.actuator).collect()
    }

    /// Drop all pending events for `actuator`. Returns whether any existed.
    pub fn cancel(&mut self, actuator: Actuator) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.actuator != actuator);
        self.pending.len() != before
    }

    pub fn is_scheduled(&self, actuator: Actuator) -> bool {
        self.pending.iter().any(|p| p.actuator == actuator)
    }

    pub fn next_fire_at(&self) -> Option<Instant> {
        self.pending.first().map(|p| p.fire_at)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
