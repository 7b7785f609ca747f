//! Umbra Scenario Runner
//!
//! Drives enemies through a scripted level headlessly and reports how
//! their behavior evolved.
//!
//! Run with: cargo run -p umbra_sim -- scenarios/cellar.toml
//!       or: UMBRA_SCENARIO=scenarios/cellar.toml cargo run --bin umbra

mod error;
mod run_config;
mod scenario;
mod sim;

use error::{Result, SimError};
use run_config::RunConfig;
use scenario::Scenario;
use sim::Simulation;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RunConfig::load();
    config.print_summary();

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: &RunConfig) -> Result<()> {
    let path = config.scenario_path.as_ref().ok_or(SimError::NoScenario)?;
    let scenario = Scenario::load(path)?;

    let mut simulation = Simulation::new(scenario, config.tick_rate)?.with_max_ticks(config.max_ticks);
    let summary = simulation.run();
    println!("{}", summary);
    Ok(())
}
