//! Sensor-value simulator for the composting chamber.
//!
//! There is no real probe hardware anywhere in this system: each tick
//! advances the four readings by a small bounded random walk and clamps the
//! result back into the physically plausible band for that field. Clamping is
//! recovery, not an error — the simulator's one job is to always hand the
//! controller a believable reading.
//!
//! The random source is an owned, seedable generator so a fixed seed yields a
//! fully reproducible tick sequence.

use time::OffsetDateTime;

use crate::state::SensorSnapshot;

// ---------------------------------------------------------------------------
// Physical bands & walk step sizes
// ---------------------------------------------------------------------------

/// Closed value range a sensor field may never leave.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

pub const TEMPERATURE_BAND: Band = Band { min: 40.0, max: 65.0 };
pub const MOISTURE_BAND: Band = Band { min: 45.0, max: 75.0 };
pub const OXYGEN_BAND: Band = Band { min: 55.0, max: 90.0 };
pub const PH_BAND: Band = Band { min: 5.5, max: 8.0 };

// Maximum per-tick change, symmetric around zero.
const TEMPERATURE_STEP: f64 = 1.0;
const MOISTURE_STEP: f64 = 1.0;
const OXYGEN_STEP: f64 = 1.5;
const PH_STEP: f64 = 0.1;

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

pub struct SensorSim {
    rng: fastrand::Rng,
}

impl SensorSim {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Seeded variant for reproducible runs and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Advance all four readings one step from `prev` and stamp `now`.
    ///
    /// Pure except for the owned RNG: the same seed and the same `prev`
    /// sequence produce identical output.
    pub fn tick(&mut self, prev: &SensorSnapshot, now: OffsetDateTime) -> SensorSnapshot {
        SensorSnapshot {
            temperature: self.walk(prev.temperature, TEMPERATURE_STEP, TEMPERATURE_BAND),
            moisture: self.walk(prev.moisture, MOISTURE_STEP, MOISTURE_BAND),
            oxygen_level: self.walk(prev.oxygen_level, OXYGEN_STEP, OXYGEN_BAND),
            ph_level: self.walk(prev.ph_level, PH_STEP, PH_BAND),
            last_updated: now,
        }
    }

    /// One random-walk step: uniform delta in `[-step, +step]`, clamped to
    /// the field's band.
    fn walk(&mut self, prev: f64, step: f64, band: Band) -> f64 {
        let delta = (self.rng.f64() * 2.0 - 1.0) * step;
        (prev + delta).clamp(band.min, band.max)
    }
}

impl Default for SensorSim {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
