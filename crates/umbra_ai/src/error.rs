//! Error types for the perception core

use crate::services::EntityId;
use thiserror::Error;

/// Errors surfaced while configuring or starting an agent
#[derive(Debug, Error)]
pub enum AiError {
    /// A profile value is out of range or inconsistent
    #[error("Invalid agent profile: {0}")]
    InvalidProfile(String),

    /// The agent could not be placed on a walkable surface
    #[error("Agent {agent} is not on a walkable surface")]
    OffNavSurface { agent: EntityId },

    /// A waypoint is not a finite position
    #[error("Waypoint {index} is not a finite position")]
    InvalidWaypoint { index: usize },
}

/// Result type for agent setup
pub type Result<T> = std::result::Result<T, AiError>;
