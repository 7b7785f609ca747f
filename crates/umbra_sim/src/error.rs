//! Error types for the scenario runner

use std::path::PathBuf;
use thiserror::Error;
use umbra_ai::AiError;

/// Scenario loading and setup errors
#[derive(Debug, Error)]
pub enum SimError {
    /// No scenario given on the command line or in the environment
    #[error("No scenario given (pass a path or set UMBRA_SCENARIO)")]
    NoScenario,

    /// Scenario file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scenario file is not valid TOML for a scenario
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    /// Scenario is well-formed but inconsistent
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    /// An agent rejected its configuration
    #[error("Agent setup failed: {0}")]
    Ai(#[from] AiError),
}

/// Result type for the runner
pub type Result<T> = std::result::Result<T, SimError>;
