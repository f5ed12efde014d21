//! Periodic driver: the single timeline everything else hangs off.
//!
//! One tokio interval produces ticks; each tick runs [`step`] under the state
//! write lock, in a fixed order:
//!
//! 1. fire due auto-idle events (regardless of operating mode — a scheduled
//!    timer belongs to the actuator, not to the evaluation that created it)
//! 2. advance the sensor simulator, only while the system is `Active`
//! 3. evaluate the automation rules against the fresh snapshot and apply any
//!    activations
//!
//! Because every mutation happens inside that one locked section, readers
//! never observe a half-applied tick.

use std::time::{Duration, Instant};

use anyhow::Result;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::control::{self, Rules};
use crate::sim::SensorSim;
use crate::state::{Actuator, SharedState, SystemState, SystemStatus};

/// Run the tick loop. Intended to be awaited (or spawned) from main; only a
/// future shutdown path returns.
pub async fn run(
    shared: SharedState,
    mut sim: SensorSim,
    rules: Rules,
    tick_every: Duration,
) -> Result<()> {
    let mut ticker = tokio::time::interval(tick_every);

    info!(tick_secs = tick_every.as_secs(), "driver started");

    loop {
        ticker.tick().await;
        let mut st = shared.write().await;
        step(&mut st, &mut sim, &rules, Instant::now(), OffsetDateTime::now_utc());
    }
}

/// One tick of the simulation clock. Synchronous so tests can drive it with
/// chosen times instead of waiting out the interval.
pub(crate) fn step(
    state: &mut SystemState,
    sim: &mut SensorSim,
    rules: &Rules,
    now: Instant,
    ts: OffsetDateTime,
) {
    for actuator in state.fire_due_auto_idle(now, ts) {
        info!(actuator = actuator.label(), "run duration elapsed, actuator idle");
    }

    if state.status != SystemStatus::Active {
        return; // paused / maintenance: the snapshot does not advance
    }

    state.snapshot = sim.tick(&state.snapshot, ts);
    debug!(
        temperature = state.snapshot.temperature,
        moisture = state.snapshot.moisture,
        oxygen = state.snapshot.oxygen_level,
        ph = state.snapshot.ph_level,
        "sensors advanced"
    );

    let activations = control::evaluate(
        rules,
        &state.snapshot,
        state.actuator(Actuator::Mixer).running,
        state.actuator(Actuator::Aeration).running,
        state.auto_mode,
    );
    for activation in activations {
        info!(
            actuator = activation.actuator.label(),
            event = activation.event,
            run_secs = activation.run_for.as_secs(),
            "automation activated"
        );
        state.apply_activation(activation, now, ts);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
