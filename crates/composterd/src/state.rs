//! Shared state container for the composter automation core.
//!
//! Everything a reader (the dashboard layer) or a command entry point touches
//! lives here, behind one lock: the current sensor snapshot, both actuators,
//! the append-only activity log, the operating mode, and the pending
//! auto-idle events. All mutation goes through the methods on [`SystemState`]
//! so the invariants (exclusive actuator ownership, activation-only logging,
//! strictly increasing log ids) hold in one place.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::control::{self, Activation, SensorLevels};
use crate::timers::AutoIdleQueue;

// ---------------------------------------------------------------------------
// Public type alias
// ---------------------------------------------------------------------------

pub type SharedState = Arc<RwLock<SystemState>>;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// The complete set of simulated sensor readings at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct SensorSnapshot {
    /// Core temperature in degrees Celsius.
    pub temperature: f64,
    /// Moisture content in percent.
    pub moisture: f64,
    /// Oxygen level in percent.
    pub oxygen_level: f64,
    /// Acidity, unitless pH.
    pub ph_level: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl SensorSnapshot {
    /// The fixed boot reading the appliance starts from.
    pub fn initial(now: OffsetDateTime) -> Self {
        Self {
            temperature: 58.0,
            moisture: 62.0,
            oxygen_level: 75.0,
            ph_level: 6.8,
            last_updated: now,
        }
    }
}

/// Whether the simulation clock advances the sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Active,
    Paused,
    Maintenance,
}

/// The two controllable actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    Mixer,
    Aeration,
}

impl Actuator {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mixer => "mixer",
            Self::Aeration => "aeration",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ActuatorState {
    pub running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_changed: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogEntry {
    pub id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub event: String,
    pub details: String,
}

// ---------------------------------------------------------------------------
// JSON response (what a reader sees)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_secs: u64,
    pub status: SystemStatus,
    pub auto_mode: bool,
    pub snapshot: SensorSnapshot,
    pub levels: SensorLevels,
    pub mixer: ActuatorState,
    pub aeration: ActuatorState,
    /// Newest entry first.
    pub log: Vec<ActivityLogEntry>,
}

// ---------------------------------------------------------------------------
// Construction & mutation
// ---------------------------------------------------------------------------

pub struct SystemState {
    started_at: Instant,
    pub status: SystemStatus,
    pub auto_mode: bool,
    pub snapshot: SensorSnapshot,
    mixer: ActuatorState,
    aeration: ActuatorState,
    /// Insertion-ordered, append-only. Entries are never mutated or removed.
    log: Vec<ActivityLogEntry>,
    next_log_id: u64,
    pub auto_idle: AutoIdleQueue,
}

impl SystemState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            status: SystemStatus::Active,
            auto_mode: true,
            snapshot: SensorSnapshot::initial(OffsetDateTime::now_utc()),
            mixer: ActuatorState::default(),
            aeration: ActuatorState::default(),
            log: Vec::new(),
            next_log_id: 1,
            auto_idle: AutoIdleQueue::new(),
        }
    }

    pub fn set_status(&mut self, status: SystemStatus) {
        self.status = status;
    }

    pub fn set_auto_mode(&mut self, on: bool) {
        self.auto_mode = on;
    }

    pub fn actuator(&self, which: Actuator) -> &ActuatorState {
        match which {
            Actuator::Mixer => &self.mixer,
            Actuator::Aeration => &self.aeration,
        }
    }

    /// Append an entry with the next sequential id. Never fails: there is no
    /// I/O behind the log.
    pub fn append_log(&mut self, event: impl Into<String>, details: impl Into<String>) -> u64 {
        let id = self.next_log_id;
        self.next_log_id += 1;
        self.log.push(ActivityLogEntry {
            id,
            timestamp: OffsetDateTime::now_utc(),
            event: event.into(),
            details: details.into(),
        });
        id
    }

    /// The activity log in insertion order (oldest first).
    pub fn log(&self) -> &[ActivityLogEntry] {
        &self.log
    }

    /// Manual actuator toggle. A defined no-op while auto mode owns the
    /// actuators; returns whether the state changed. Only activation logs —
    /// switching an actuator off is silent, and also drops any auto-idle
    /// event still pending for it (the event would be moot).
    pub fn toggle_actuator(&mut self, which: Actuator) -> bool {
        if self.auto_mode {
            return false;
        }
        let turned_on = !self.actuator(which).running;
        self.set_running(which, turned_on, OffsetDateTime::now_utc());
        if turned_on {
            match which {
                Actuator::Mixer => {
                    self.append_log("Manual Mixing", "Mixer manually activated by user.")
                }
                Actuator::Aeration => self.append_log(
                    "Manual Aeration",
                    "Aeration system manually activated by user.",
                ),
            };
        } else {
            self.auto_idle.cancel(which);
        }
        true
    }

    /// Start an actuator the controller decided to activate: mark it running,
    /// schedule its return to idle, and log the cause.
    pub fn apply_activation(&mut self, activation: Activation, now: Instant, ts: OffsetDateTime) {
        self.set_running(activation.actuator, true, ts);
        self.auto_idle
            .schedule(activation.actuator, now + activation.run_for);
        self.append_log(activation.event, activation.details);
    }

    /// Drain auto-idle events that have come due and stop their actuators.
    /// Returns the actuators that went idle.
    pub fn fire_due_auto_idle(&mut self, now: Instant, ts: OffsetDateTime) -> Vec<Actuator> {
        let fired = self.auto_idle.due(now);
        for &actuator in &fired {
            self.set_running(actuator, false, ts);
        }
        fired
    }

    /// Build the JSON-serialisable status snapshot for readers.
    pub fn to_status(&self) -> StatusResponse {
        StatusResponse {
            uptime_secs: self.started_at.elapsed().as_secs(),
            status: self.status,
            auto_mode: self.auto_mode,
            snapshot: self.snapshot.clone(),
            levels: control::levels(&self.snapshot),
            mixer: self.mixer.clone(),
            aeration: self.aeration.clone(),
            log: self.log.iter().rev().cloned().collect(),
        }
    }

    fn set_running(&mut self, which: Actuator, on: bool, ts: OffsetDateTime) {
        let actuator = match which {
            Actuator::Mixer => &mut self.mixer,
            Actuator::Aeration => &mut self.aeration,
        };
        actuator.running = on;
        actuator.last_changed = Some(ts);
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
