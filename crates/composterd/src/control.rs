//! Hysteretic automation rules and sensor status classification.
//!
//! `evaluate` is a pure transition function: given a snapshot, the current
//! actuator flags, and the control mode, it returns the activations to apply
//! (at most one per actuator). It never mutates anything itself — the driver
//! owns applying decisions to shared state — which is what lets tests feed it
//! synthetic snapshots without running the simulator.
//!
//! ## Hysteresis
//!
//! ```text
//! Idle ──[condition met]──▶ Running ──[run duration elapsed]──▶ Idle
//!          (logs once)        │
//!                             └─ condition re-checks are ignored while
//!                                running; the auto-idle timer is the only
//!                                path back in auto mode
//! ```

use serde::Serialize;
use std::time::Duration;

use crate::state::{Actuator, SensorSnapshot};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Trigger thresholds and run durations for the two automation rules.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    /// Mixer activates when moisture rises above this (percent).
    pub mixer_moisture_trigger: f64,
    pub mixer_run: Duration,
    /// Aeration activates when oxygen falls below this (percent).
    pub aeration_oxygen_trigger: f64,
    pub aeration_run: Duration,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            mixer_moisture_trigger: 68.0,
            mixer_run: Duration::from_secs(8),
            aeration_oxygen_trigger: 65.0,
            aeration_run: Duration::from_secs(10),
        }
    }
}

/// A single activation decision: which actuator to start, for how long, and
/// the log entry explaining why.
#[derive(Debug, Clone)]
pub struct Activation {
    pub actuator: Actuator,
    pub run_for: Duration,
    pub event: &'static str,
    pub details: String,
}

/// Evaluate both rules against a snapshot.
///
/// Entirely a no-op while `auto_mode` is off — manual commands own the
/// actuators then. A rule whose actuator is already running never re-fires,
/// however long its condition stays true.
pub fn evaluate(
    rules: &Rules,
    snapshot: &SensorSnapshot,
    mixer_running: bool,
    aeration_running: bool,
    auto_mode: bool,
) -> Vec<Activation> {
    if !auto_mode {
        return Vec::new();
    }

    let mut activations = Vec::new();

    if snapshot.moisture > rules.mixer_moisture_trigger && !mixer_running {
        activations.push(Activation {
            actuator: Actuator::Mixer,
            run_for: rules.mixer_run,
            event: "Auto Mixing",
            details: format!(
                "Activated mixer due to high moisture ({:.1}%)",
                snapshot.moisture
            ),
        });
    }

    if snapshot.oxygen_level < rules.aeration_oxygen_trigger && !aeration_running {
        activations.push(Activation {
            actuator: Actuator::Aeration,
            run_for: rules.aeration_run,
            event: "Auto Aeration",
            details: format!(
                "Activated aeration due to low oxygen ({:.1}%)",
                snapshot.oxygen_level
            ),
        });
    }

    activations
}

// ---------------------------------------------------------------------------
// Status classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Optimal,
    High,
}

#[derive(Debug, Clone, Copy)]
pub enum Metric {
    Temperature,
    Moisture,
    Oxygen,
    Ph,
}

/// Classify a raw reading against the field's display thresholds.
/// Read-only and deterministic; used for dashboard badges and as the
/// controller's intent signal.
pub fn classify(metric: Metric, value: f64) -> Level {
    let (low, high) = match metric {
        Metric::Temperature => (45.0, 55.0),
        Metric::Moisture => (50.0, 70.0),
        Metric::Oxygen => (60.0, 85.0),
        Metric::Ph => (6.0, 7.5),
    };
    if value < low {
        Level::Low
    } else if value > high {
        Level::High
    } else {
        Level::Optimal
    }
}

/// Per-field classification of a whole snapshot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SensorLevels {
    pub temperature: Level,
    pub moisture: Level,
    pub oxygen_level: Level,
    pub ph_level: Level,
}

pub fn levels(snapshot: &SensorSnapshot) -> SensorLevels {
    SensorLevels {
        temperature: classify(Metric::Temperature, snapshot.temperature),
        moisture: classify(Metric::Moisture, snapshot.moisture),
        oxygen_level: classify(Metric::Oxygen, snapshot.oxygen_level),
        ph_level: classify(Metric::Ph, snapshot.ph_level),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::OffsetDateTime;

    const TS: OffsetDateTime = datetime!(2025-04-06 09:15:00 UTC);

    /// Snapshot with every field mid-band: triggers nothing.
    fn quiet_snapshot() -> SensorSnapshot {
        SensorSnapshot {
            temperature: 50.0,
            moisture: 60.0,
            oxygen_level: 80.0,
            ph_level: 6.8,
            last_updated: TS,
        }
    }

    // -- evaluate: mixer rule -----------------------------------------------

    #[test]
    fn high_moisture_activates_idle_mixer() {
        let mut snap = quiet_snapshot();
        snap.moisture = 69.0;

        let out = evaluate(&Rules::default(), &snap, false, false, true);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].actuator, Actuator::Mixer);
        assert_eq!(out[0].event, "Auto Mixing");
        assert_eq!(out[0].run_for, Duration::from_secs(8));
        assert!(out[0].details.contains("69.0"), "details: {}", out[0].details);
    }

    #[test]
    fn running_mixer_never_refires() {
        let mut snap = quiet_snapshot();
        snap.moisture = 70.0;

        let out = evaluate(&Rules::default(), &snap, true, false, true);
        assert!(out.is_empty());
    }

    #[test]
    fn moisture_exactly_at_trigger_does_not_fire() {
        let mut snap = quiet_snapshot();
        snap.moisture = 68.0; // strict > comparison

        let out = evaluate(&Rules::default(), &snap, false, false, true);
        assert!(out.is_empty());
    }

    // -- evaluate: aeration rule --------------------------------------------

    #[test]
    fn low_oxygen_activates_idle_aeration() {
        let mut snap = quiet_snapshot();
        snap.oxygen_level = 62.5;

        let out = evaluate(&Rules::default(), &snap, false, false, true);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].actuator, Actuator::Aeration);
        assert_eq!(out[0].event, "Auto Aeration");
        assert_eq!(out[0].run_for, Duration::from_secs(10));
        assert!(out[0].details.contains("62.5"));
    }

    #[test]
    fn oxygen_exactly_at_trigger_does_not_fire() {
        let mut snap = quiet_snapshot();
        snap.oxygen_level = 65.0; // strict < comparison

        let out = evaluate(&Rules::default(), &snap, false, false, true);
        assert!(out.is_empty());
    }

    // -- evaluate: rule independence ----------------------------------------

    #[test]
    fn both_rules_can_fire_in_one_evaluation() {
        let mut snap = quiet_snapshot();
        snap.moisture = 72.0;
        snap.oxygen_level = 58.0;

        let out = evaluate(&Rules::default(), &snap, false, false, true);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].actuator, Actuator::Mixer);
        assert_eq!(out[1].actuator, Actuator::Aeration);
    }

    #[test]
    fn running_mixer_does_not_block_aeration() {
        let mut snap = quiet_snapshot();
        snap.moisture = 72.0;
        snap.oxygen_level = 58.0;

        let out = evaluate(&Rules::default(), &snap, true, false, true);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].actuator, Actuator::Aeration);
    }

    // -- evaluate: manual mode ----------------------------------------------

    #[test]
    fn manual_mode_is_a_no_op() {
        let mut snap = quiet_snapshot();
        snap.moisture = 74.0;
        snap.oxygen_level = 56.0;

        let out = evaluate(&Rules::default(), &snap, false, false, false);
        assert!(out.is_empty());
    }

    #[test]
    fn quiet_snapshot_triggers_nothing() {
        let out = evaluate(&Rules::default(), &quiet_snapshot(), false, false, true);
        assert!(out.is_empty());
    }

    // -- classify ------------------------------------------------------------

    #[test]
    fn classify_temperature_boundaries() {
        assert_eq!(classify(Metric::Temperature, 44.9), Level::Low);
        assert_eq!(classify(Metric::Temperature, 45.0), Level::Optimal);
        assert_eq!(classify(Metric::Temperature, 55.0), Level::Optimal);
        assert_eq!(classify(Metric::Temperature, 55.1), Level::High);
    }

    #[test]
    fn classify_moisture_boundaries() {
        assert_eq!(classify(Metric::Moisture, 49.9), Level::Low);
        assert_eq!(classify(Metric::Moisture, 50.0), Level::Optimal);
        assert_eq!(classify(Metric::Moisture, 70.0), Level::Optimal);
        assert_eq!(classify(Metric::Moisture, 70.1), Level::High);
    }

    #[test]
    fn classify_oxygen_boundaries() {
        assert_eq!(classify(Metric::Oxygen, 59.9), Level::Low);
        assert_eq!(classify(Metric::Oxygen, 60.0), Level::Optimal);
        assert_eq!(classify(Metric::Oxygen, 85.0), Level::Optimal);
        assert_eq!(classify(Metric::Oxygen, 85.1), Level::High);
    }

    #[test]
    fn classify_ph_boundaries() {
        assert_eq!(classify(Metric::Ph, 5.9), Level::Low);
        assert_eq!(classify(Metric::Ph, 6.0), Level::Optimal);
        assert_eq!(classify(Metric::Ph, 7.5), Level::Optimal);
        assert_eq!(classify(Metric::Ph, 7.6), Level::High);
    }

    #[test]
    fn levels_classifies_every_field() {
        let snap = quiet_snapshot();
        let levels = levels(&snap);
        assert_eq!(levels.temperature, Level::Optimal);
        assert_eq!(levels.moisture, Level::Optimal);
        assert_eq!(levels.oxygen_level, Level::Optimal);
        assert_eq!(levels.ph_level, Level::Optimal);
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Level::Optimal).unwrap(), "optimal");
        assert_eq!(serde_json::to_value(Level::Low).unwrap(), "low");
        assert_eq!(serde_json::to_value(Level::High).unwrap(), "high");
    }
}
