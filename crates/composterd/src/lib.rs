//! Automation core for a simulated composting appliance.
//!
//! Everything runs in one process against transient memory: a periodic
//! driver advances a clamped random-walk [`sim::SensorSim`], the hysteretic
//! rules in [`control`] decide when the mixer and aeration actuators run,
//! and every activation lands in the append-only activity log inside
//! [`state::SystemState`]. A presentation layer reads and commands the core
//! exclusively through [`state::SystemState`] behind the shared lock.

pub mod config;
pub mod control;
pub mod driver;
pub mod sim;
pub mod state;
pub mod timers;
