//! Contracts with the actors around the core
//!
//! The core never moves bodies, reloads levels or reads input itself.
//! It talks to the game through these traits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an agent, target or collider owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stance queries about a target
pub trait Posture {
    /// Whether the target is in a stealth-reducing crouch
    fn is_crouching(&self, target: EntityId) -> bool;
}

impl<F> Posture for F
where
    F: Fn(EntityId) -> bool,
{
    fn is_crouching(&self, target: EntityId) -> bool {
        self(target)
    }
}

/// Posture source for games without a crouch mechanic
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysStanding;

impl Posture for AlwaysStanding {
    fn is_crouching(&self, _target: EntityId) -> bool {
        false
    }
}

/// The fire-once "eliminate target" action.
///
/// Disables the target's movement and resets the level.
pub trait Eliminator {
    fn eliminate(&mut self, target: EntityId);
}

impl<F> Eliminator for F
where
    F: FnMut(EntityId),
{
    fn eliminate(&mut self, target: EntityId) {
        self(target)
    }
}
