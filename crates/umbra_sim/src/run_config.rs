//! Run configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. First positional argument: `umbra scenarios/cellar.toml`
//! 2. Environment variable: `UMBRA_SCENARIO=scenarios/cellar.toml`
//!
//! `UMBRA_TICK_RATE` overrides the scenario's tick rate and
//! `UMBRA_MAX_TICKS` caps the run length.

use std::path::PathBuf;

/// Where to find the scenario and how to run it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    pub scenario_path: Option<PathBuf>,
    pub tick_rate: Option<f64>,
    pub max_ticks: Option<u64>,
}

impl RunConfig {
    /// Load from the process arguments and environment
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build from explicit sources
    pub fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = env("UMBRA_SCENARIO").filter(|p| !p.is_empty()) {
            log::info!("Scenario from env: {}", path);
            config.scenario_path = Some(PathBuf::from(path));
        }

        // First non-flag argument wins over the environment
        if let Some(arg) = args.iter().find(|a| !a.starts_with("--")) {
            log::info!("Scenario from args: {}", arg);
            config.scenario_path = Some(PathBuf::from(arg));
        }

        if let Some(rate) = env("UMBRA_TICK_RATE") {
            match rate.parse::<f64>() {
                Ok(r) if r.is_finite() && r > 0.0 => config.tick_rate = Some(r),
                _ => log::warn!("Ignoring invalid UMBRA_TICK_RATE '{}'", rate),
            }
        }

        if let Some(ticks) = env("UMBRA_MAX_TICKS") {
            match ticks.parse::<u64>() {
                Ok(t) => config.max_ticks = Some(t),
                Err(_) => log::warn!("Ignoring invalid UMBRA_MAX_TICKS '{}'", ticks),
            }
        }

        config
    }

    pub fn print_summary(&self) {
        log::info!("Run Configuration:");
        match &self.scenario_path {
            Some(path) => log::info!("  Scenario: {}", path.display()),
            None => log::info!("  Scenario: <none>"),
        }
        if let Some(rate) = self.tick_rate {
            log::info!("  Tick rate override: {} Hz", rate);
        }
        if let Some(ticks) = self.max_ticks {
            log::info!("  Max ticks: {}", ticks);
        }
    }
}
