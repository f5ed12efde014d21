use anyhow::Result;
use std::{env, sync::Arc};
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use composterd::sim::SensorSim;
use composterd::state::{SharedState, SystemState};
use composterd::{config, driver};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Env config ──────────────────────────────────────────────────
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "composter.toml".to_string());
    let cfg = config::load(&config_path)?;

    // SIM_SEED makes a whole run reproducible; unset means fresh entropy.
    let sim = match env::var("SIM_SEED").ok().and_then(|s| s.parse().ok()) {
        Some(seed) => SensorSim::with_seed(seed),
        None => SensorSim::new(),
    };

    // ── Shared state ────────────────────────────────────────────────
    let shared: SharedState = Arc::new(RwLock::new(SystemState::new()));
    {
        let mut st = shared.write().await;
        st.append_log("System", "Composter automation core started.");
    }

    tracing::info!(
        config = %config_path,
        tick_secs = cfg.simulator.tick_secs,
        "composterd starting"
    );

    driver::run(shared, sim, cfg.rules(), cfg.tick_every()).await
}
