//! TOML config file loading and validation for the automation core.
//!
//! Every field has a default matching the reference appliance behaviour, so
//! running without a config file is fully supported. Validation collects
//! every violation before reporting, not just the first one.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::control::Rules;
use crate::sim::{MOISTURE_BAND, OXYGEN_BAND};

// ---------------------------------------------------------------------------
// Config file structures
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulator: SimulatorSection,
    #[serde(default)]
    pub automation: AutomationSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulatorSection {
    /// Seconds between simulation ticks.
    pub tick_secs: u64,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self { tick_secs: 5 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationSection {
    /// Moisture percentage above which the mixer activates.
    pub mixer_moisture_trigger: f64,
    /// How long an automatic mixing run lasts, in seconds.
    pub mixer_run_secs: u64,
    /// Oxygen percentage below which aeration activates.
    pub aeration_oxygen_trigger: f64,
    /// How long an automatic aeration run lasts, in seconds.
    pub aeration_run_secs: u64,
}

impl Default for AutomationSection {
    fn default() -> Self {
        Self {
            mixer_moisture_trigger: 68.0,
            mixer_run_secs: 8,
            aeration_oxygen_trigger: 65.0,
            aeration_run_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl Config {
    /// Validate all entries. Returns `Ok(())` or an error describing every
    /// violation found.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.simulator.tick_secs == 0 {
            errors.push("simulator.tick_secs must be positive".to_string());
        }

        let a = &self.automation;
        if a.mixer_run_secs == 0 {
            errors.push("automation.mixer_run_secs must be positive".to_string());
        }
        if a.aeration_run_secs == 0 {
            errors.push("automation.aeration_run_secs must be positive".to_string());
        }
        if !MOISTURE_BAND.contains(a.mixer_moisture_trigger) {
            errors.push(format!(
                "automation.mixer_moisture_trigger {} outside moisture band [{}, {}]",
                a.mixer_moisture_trigger, MOISTURE_BAND.min, MOISTURE_BAND.max
            ));
        }
        if !OXYGEN_BAND.contains(a.aeration_oxygen_trigger) {
            errors.push(format!(
                "automation.aeration_oxygen_trigger {} outside oxygen band [{}, {}]",
                a.aeration_oxygen_trigger, OXYGEN_BAND.min, OXYGEN_BAND.max
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "config validation failed ({} error{}):\n  - {}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" },
                errors.join("\n  - ")
            );
        }
    }

    pub fn tick_every(&self) -> Duration {
        Duration::from_secs(self.simulator.tick_secs)
    }

    pub fn rules(&self) -> Rules {
        Rules {
            mixer_moisture_trigger: self.automation.mixer_moisture_trigger,
            mixer_run: Duration::from_secs(self.automation.mixer_run_secs),
            aeration_oxygen_trigger: self.automation.aeration_oxygen_trigger,
            aeration_run: Duration::from_secs(self.automation.aeration_run_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read, parse, and validate a TOML config file. A missing file is not an
/// error: the defaults describe the reference appliance.
pub fn load(path: &str) -> Result<Config> {
    if !Path::new(path).exists() {
        tracing::info!(path, "no config file found, using defaults");
        return Ok(Config::default());
    }
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read config: {path}"))?;
    let config: Config =
        toml::from_str(&contents).with_context(|| format!("failed to parse config: {path}"))?;
    config
        .validate()
        .with_context(|| format!("invalid config: {path}"))?;
    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================
