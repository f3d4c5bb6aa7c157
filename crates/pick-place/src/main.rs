//! Runs one simulated pick-and-place episode.
//!
//! Usage: `pick-place-sim [config.yaml]`. Without a file the default cell is simulated.
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::Result;
use bt_tools::TraceLog;
use pick_place::{SimConfig, Simulation};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SimConfig::load(&path)?,
        None => SimConfig::default(),
    };

    let sim = Simulation::new(&config)?;
    let mut log = TraceLog::default();
    let outcome = sim.run_with_sink(&mut log)?;

    tracing::info!(
        ?outcome,
        ticks = log.last_tick().map_or(0, |tick| tick + 1),
        events = log.events.len(),
        "episode finished"
    );
    println!("{}", sim.world().borrow());

    if outcome.is_success() {
        Ok(())
    } else {
        anyhow::bail!("pick and place did not succeed ({outcome:?})")
    }
}
