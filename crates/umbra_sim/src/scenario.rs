//! Scenario files
//!
//! A scenario describes a level in TOML: occluders, enemies and their
//! routes, a keyframed target, an optional flashlight and scripted noises.
//!
//! # Example Scenario
//!
//! ```toml
//! name = "cellar"
//! tick_rate = 30.0
//! duration = 20.0
//!
//! [[occluders]]
//! shape = "box"
//! min = { x = -4.0, y = 0.0, z = 6.0 }
//! max = { x = 4.0, y = 3.0, z = 6.5 }
//!
//! [[agents]]
//! name = "crawler"
//! preset = "stalker"
//! position = { x = 0.0, y = 0.0, z = 0.0 }
//! waypoints = [{ x = 0.0, y = 0.0, z = 10.0 }, { x = 10.0, y = 0.0, z = 10.0 }]
//!
//! [agents.overrides]
//! chase_speed = 8.0
//!
//! [[target.keyframes]]
//! time = 0.0
//! position = { x = 0.0, y = 0.0, z = 12.0 }
//!
//! [[noises]]
//! time = 2.0
//! position = { x = 3.0, y = 0.0, z = 4.0 }
//! gait = "run"
//! ```

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use umbra_ai::emitter::{Gait, NoiseEmitter};
use umbra_ai::noise::DEFAULT_NOISE_LIFETIME;
use umbra_ai::profile::AgentProfile;
use umbra_ai::scene::ColliderShape;
use umbra_math::{inverse_lerp, Vec3, AABB};

/// A complete scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub tick_rate: f64,
    /// Seconds of simulated time before the run stops
    pub duration: f64,
    pub noise_lifetime: f64,
    /// Walkable area; agents outside it must snap onto it at startup
    pub walkable: Option<AABB>,
    pub stopping_tolerance: f32,
    pub occluders: Vec<ColliderShape>,
    pub agents: Vec<AgentSpec>,
    pub target: Option<TargetSpec>,
    pub flashlight: Option<FlashlightSpec>,
    /// Loudness presets for scripted gait and throw noises
    pub emitter: NoiseEmitter,
    pub noises: Vec<NoiseSpec>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            tick_rate: 60.0,
            duration: 30.0,
            noise_lifetime: DEFAULT_NOISE_LIFETIME,
            walkable: None,
            stopping_tolerance: 0.1,
            occluders: Vec::new(),
            agents: Vec::new(),
            target: None,
            flashlight: None,
            emitter: NoiseEmitter::default(),
            noises: Vec::new(),
        }
    }
}

/// One enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Profile fields replacing the preset's values
    #[serde(default)]
    pub overrides: Option<toml::Table>,
    pub position: Vec3,
    #[serde(default = "default_forward")]
    pub forward: Vec3,
    #[serde(default)]
    pub waypoints: Vec<Vec3>,
}

fn default_preset() -> String {
    "listener".to_string()
}

fn default_forward() -> Vec3 {
    Vec3::Z
}

impl AgentSpec {
    /// Preset with overrides applied
    pub fn resolve_profile(&self) -> Result<AgentProfile> {
        let preset = AgentProfile::preset(&self.preset).ok_or_else(|| {
            SimError::InvalidScenario(format!("Agent '{}': unknown preset '{}'", self.name, self.preset))
        })?;

        let Some(overrides) = &self.overrides else {
            return Ok(preset);
        };

        let mut table = match toml::Value::try_from(&preset) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) | Err(_) => {
                return Err(SimError::InvalidScenario(format!(
                    "Agent '{}': preset could not be expanded",
                    self.name
                )))
            }
        };
        merge_tables(&mut table, overrides);

        toml::Value::Table(table).try_into().map_err(SimError::from)
    }
}

/// Overlay `overrides` onto `base`, descending into nested tables
fn merge_tables(base: &mut toml::Table, overrides: &toml::Table) {
    for (key, value) in overrides {
        if let (Some(toml::Value::Table(inner)), toml::Value::Table(patch)) = (base.get_mut(key), value) {
            merge_tables(inner, patch);
            continue;
        }
        base.insert(key.clone(), value.clone());
    }
}

/// A position (and stance) at a point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetKeyframe {
    pub time: f64,
    pub position: Vec3,
    #[serde(default)]
    pub crouching: bool,
}

/// The hunted character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Collision radius used for occlusion
    #[serde(default = "default_target_radius")]
    pub radius: f32,
    pub keyframes: Vec<TargetKeyframe>,
}

fn default_target_radius() -> f32 {
    0.4
}

impl TargetSpec {
    /// Interpolated position and held stance at `time`
    pub fn sample(&self, time: f64) -> Option<(Vec3, bool)> {
        sample_track(&self.keyframes, time, |k| k.time, |a, b, t| {
            (a.position.lerp(b.position, t), a.crouching)
        })
    }
}

/// Flashlight pose at a point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlashlightKeyframe {
    pub time: f64,
    pub position: Vec3,
    pub forward: Vec3,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Flashlight carried by the target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashlightSpec {
    #[serde(default = "default_light_range")]
    pub range: f32,
    #[serde(default = "default_spot_angle")]
    pub spot_angle: f32,
    pub keyframes: Vec<FlashlightKeyframe>,
}

fn default_light_range() -> f32 {
    20.0
}

fn default_spot_angle() -> f32 {
    60.0
}

impl FlashlightSpec {
    /// Interpolated pose and held switch state at `time`
    pub fn sample(&self, time: f64) -> Option<(Vec3, Vec3, bool)> {
        sample_track(&self.keyframes, time, |k| k.time, |a, b, t| {
            (
                a.position.lerp(b.position, t),
                a.forward.lerp(b.forward, t).normalize_or_zero(),
                a.enabled,
            )
        })
    }
}

/// A scripted noise
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoiseSpec {
    pub time: f64,
    pub position: Vec3,
    /// Explicit loudness
    #[serde(default)]
    pub intensity: Option<f32>,
    /// Footstep loudness from the emitter presets
    #[serde(default)]
    pub gait: Option<Gait>,
    /// Thrown-object impact from the emitter presets
    #[serde(default)]
    pub throw: bool,
}

/// Sample a keyframe track. Values hold before the first and after the
/// last keyframe; `blend` receives the surrounding pair and a 0..1 factor.
fn sample_track<K, T>(
    keys: &[K],
    time: f64,
    key_time: impl Fn(&K) -> f64,
    blend: impl Fn(&K, &K, f32) -> T,
) -> Option<T> {
    let first = keys.first()?;
    if time <= key_time(first) {
        return Some(blend(first, first, 0.0));
    }

    for pair in keys.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if time < key_time(b) {
            let t = inverse_lerp(key_time(a) as f32, key_time(b) as f32, time as f32);
            return Some(blend(a, b, t));
        }
    }

    let last = keys.last()?;
    Some(blend(last, last, 0.0))
}

impl Scenario {
    /// Read and validate a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_toml(&content)?;
        log::info!("Loaded scenario '{}' from {}", scenario.name, path.display());
        Ok(scenario)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Structural checks the runner relies on
    pub fn validate(&self) -> Result<()> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(SimError::InvalidScenario(format!("tick_rate must be positive, got {}", self.tick_rate)));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(SimError::InvalidScenario(format!("duration must not be negative, got {}", self.duration)));
        }
        if self.agents.is_empty() {
            log::warn!("Scenario '{}' has no agents", self.name);
        }

        let mut names: Vec<&str> = self.agents.iter().map(|a| a.name.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(SimError::InvalidScenario(format!("duplicate agent name '{}'", pair[0])));
        }

        if let Some(target) = &self.target {
            check_sorted("target", target.keyframes.iter().map(|k| k.time))?;
        }
        if let Some(light) = &self.flashlight {
            check_sorted("flashlight", light.keyframes.iter().map(|k| k.time))?;
        }
        Ok(())
    }
}

fn check_sorted(track: &str, times: impl Iterator<Item = f64>) -> Result<()> {
    let mut previous = f64::NEG_INFINITY;
    for time in times {
        if time < previous {
            return Err(SimError::InvalidScenario(format!("{} keyframes are not in time order", track)));
        }
        previous = time;
    }
    Ok(())
}
