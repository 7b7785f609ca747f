//! Umbra AI - Perception and Behavior for Stealth-Horror Enemies
//!
//! This crate decides, every tick, what an enemy believes about the
//! world and which behavior it runs.
//!
//! # Features
//!
//! - Shared noise log with expiry and two listening policies
//! - Line of sight with view cone and occlusion
//! - Light exposure reports and a flashlight scanner
//! - Proximity hunters that light freezes instead of provoking
//! - Patrol / investigate / chase arbitration with cooldowns and memory
//! - Delayed one-shot proximity kill
//!
//! # Example
//!
//! ```ignore
//! use umbra_ai::prelude::*;
//!
//! let mut noise = NoiseLog::default();
//! let mut agent = BehaviorAgent::new(EntityId(1), AgentProfile::stalker(), waypoints)?;
//! agent.start(&mut mover)?;
//!
//! noise.expire(now);
//! noise.report(footstep, 1.0);
//! let report = agent.tick(&ctx, &mut actuators);
//! ```

pub mod agent;
pub mod clock;
pub mod emitter;
pub mod error;
pub mod kill;
pub mod light;
pub mod locomotion;
pub mod noise;
pub mod profile;
pub mod scene;
pub mod services;
pub mod sight;
pub mod state;

pub mod prelude {
    pub use crate::agent::{Actuators, AgentPose, BehaviorAgent, TargetState, TickContext, TickReport};
    pub use crate::clock::{Deadline, SimClock, SimTime};
    pub use crate::emitter::{Gait, NoiseEmitter};
    pub use crate::error::AiError;
    pub use crate::kill::KillTrigger;
    pub use crate::light::{Flashlight, LightExposure, LitAgent};
    pub use crate::locomotion::{has_arrived, Locomotion, StraightLineMover};
    pub use crate::noise::{HeardNoise, NoiseEvent, NoiseId, NoiseLog, NoisePolicy};
    pub use crate::profile::{AgentProfile, LightReaction, SenseSet};
    pub use crate::scene::{ColliderScene, ColliderShape};
    pub use crate::services::{AlwaysStanding, Eliminator, EntityId, Posture};
    pub use crate::sight::{LineOfSight, Occlusion, OpenSpace, RaycastHit, Visibility};
    pub use crate::state::{AggroCause, Behavior, PerceptionState};
}

pub use error::Result;
pub use prelude::*;
