//! Scenario simulation
//!
//! Per step: clock, noise expiry, scripted noises, target update,
//! movement, flashlight scan and light reports, then every agent ticks.
//! The run ends when the duration is reached or a target is eliminated.

use crate::error::Result;
use crate::scenario::{FlashlightSpec, NoiseSpec, Scenario, TargetSpec};
use std::fmt;
use umbra_ai::prelude::*;
use umbra_math::Vec3;

/// Entity id of the scenario's target
pub const TARGET_ID: EntityId = EntityId(1);

/// High bits keep agent and occluder ids in disjoint ranges
const AGENT_ID_TAG: u64 = 1 << 62;
const OCCLUDER_ID_TAG: u64 = 1 << 63;

fn agent_id(index: usize) -> EntityId {
    EntityId(AGENT_ID_TAG | index as u64)
}

fn occluder_id(index: usize) -> EntityId {
    EntityId(OCCLUDER_ID_TAG | index as u64)
}

/// Agent body collider, centered this far above the feet
const AGENT_BODY_HEIGHT: f32 = 1.0;
const AGENT_BODY_RADIUS: f32 = 0.5;

struct SimAgent {
    name: String,
    agent: BehaviorAgent,
}

/// Who was eliminated, by whom and when
#[derive(Debug, Clone, PartialEq)]
pub struct Elimination {
    pub victim: EntityId,
    pub by: String,
    pub at: SimTime,
}

/// End-of-run report
#[derive(Debug, Clone)]
pub struct Summary {
    pub scenario: String,
    pub ticks: u64,
    pub time: SimTime,
    pub transitions: usize,
    pub noises: usize,
    pub eliminated: Option<Elimination>,
    pub agents: Vec<AgentOutcome>,
}

/// Where an agent ended up
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    pub name: String,
    pub behavior: Behavior,
    pub position: Option<Vec3>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scenario '{}': {} ticks, {:.2}s simulated",
            self.scenario, self.ticks, self.time
        )?;
        writeln!(f, "  noises reported: {}", self.noises)?;
        writeln!(f, "  behavior transitions: {}", self.transitions)?;
        for agent in &self.agents {
            match agent.position {
                Some(p) => writeln!(
                    f,
                    "  {}: {} at ({:.1}, {:.1}, {:.1})",
                    agent.name, agent.behavior, p.x, p.y, p.z
                )?,
                None => writeln!(f, "  {}: {}", agent.name, agent.behavior)?,
            }
        }
        match &self.eliminated {
            Some(e) => write!(f, "  target {} eliminated by {} at {:.2}s", e.victim, e.by, e.at),
            None => write!(f, "  target survived"),
        }
    }
}

/// A running scenario
pub struct Simulation {
    name: String,
    clock: SimClock,
    duration: f64,
    max_ticks: Option<u64>,
    noise: NoiseLog,
    scene: ColliderScene,
    mover: StraightLineMover,
    agents: Vec<SimAgent>,
    target: Option<TargetSpec>,
    target_state: Option<TargetState>,
    crouching: bool,
    flashlight: Option<(FlashlightSpec, Flashlight)>,
    emitter: NoiseEmitter,
    noises: Vec<NoiseSpec>,
    next_noise: usize,
    noises_reported: usize,
    transitions: usize,
    eliminated: Option<Elimination>,
}

impl Simulation {
    /// Build the level and start every agent
    pub fn new(scenario: Scenario, tick_rate: Option<f64>) -> Result<Self> {
        scenario.validate()?;
        let rate = tick_rate.unwrap_or(scenario.tick_rate);

        let mut mover = StraightLineMover::new().with_stopping_tolerance(scenario.stopping_tolerance);
        if let Some(area) = scenario.walkable {
            mover = mover.with_walkable(area);
        }

        let mut scene = ColliderScene::new();
        for (i, shape) in scenario.occluders.iter().enumerate() {
            scene.add(occluder_id(i), *shape);
        }

        let mut target_state = None;
        let mut crouching = false;
        if let Some(target) = &scenario.target {
            if let Some((position, crouch)) = target.sample(0.0) {
                scene.add_sphere(TARGET_ID, position, target.radius);
                target_state = Some(TargetState {
                    id: TARGET_ID,
                    position,
                });
                crouching = crouch;
            }
        }

        let mut agents = Vec::with_capacity(scenario.agents.len());
        for (i, spec) in scenario.agents.iter().enumerate() {
            let id = agent_id(i);
            let profile = spec.resolve_profile()?;
            let mut agent = BehaviorAgent::new(id, profile, spec.waypoints.clone())?;

            mover.add_agent(id, spec.position, spec.forward);
            agent.start(&mut mover)?;

            let body = mover.position(id).unwrap_or(spec.position);
            scene.add_sphere(id, body + Vec3::UP * AGENT_BODY_HEIGHT, AGENT_BODY_RADIUS);
            log::info!("Agent '{}' is {}", spec.name, id);
            agents.push(SimAgent {
                name: spec.name.clone(),
                agent,
            });
        }

        let flashlight = scenario.flashlight.clone().map(|spec| {
            let light = Flashlight {
                range: spec.range,
                spot_angle: spec.spot_angle,
                ..Flashlight::new(TARGET_ID)
            };
            (spec, light)
        });

        let mut noises = scenario.noises.clone();
        noises.sort_by(|a, b| a.time.total_cmp(&b.time));

        Ok(Self {
            name: scenario.name,
            clock: SimClock::new(rate),
            duration: scenario.duration,
            max_ticks: None,
            noise: NoiseLog::new(scenario.noise_lifetime),
            scene,
            mover,
            agents,
            target: scenario.target,
            target_state,
            crouching,
            flashlight,
            emitter: scenario.emitter,
            noises,
            next_noise: 0,
            noises_reported: 0,
            transitions: 0,
            eliminated: None,
        })
    }

    /// Stop after at most `ticks` steps
    pub fn with_max_ticks(mut self, ticks: Option<u64>) -> Self {
        self.max_ticks = ticks;
        self
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn agent(&self, name: &str) -> Option<&BehaviorAgent> {
        self.agents.iter().find(|a| a.name == name).map(|a| &a.agent)
    }

    pub fn agent_position(&self, name: &str) -> Option<Vec3> {
        self.agent(name).and_then(|a| self.mover.position(a.id()))
    }

    pub fn is_finished(&self) -> bool {
        self.eliminated.is_some()
            || self.clock.now() >= self.duration
            || self.max_ticks.is_some_and(|max| self.clock.ticks() >= max)
    }

    /// Advance one tick. Returns false once the run is over.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }

        let now = self.clock.advance();
        self.noise.expire(now);
        self.emit_scripted_noises(now);
        self.update_target(now);
        self.mover.update(self.clock.step() as f32);
        self.sync_agent_bodies();
        self.deliver_light(now);
        self.tick_agents(now);

        !self.is_finished()
    }

    /// Step until finished
    pub fn run(&mut self) -> Summary {
        log::info!("Running scenario '{}' for {:.2}s", self.name, self.duration);
        while self.step() {}
        self.summary()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            scenario: self.name.clone(),
            ticks: self.clock.ticks(),
            time: self.clock.now(),
            transitions: self.transitions,
            noises: self.noises_reported,
            eliminated: self.eliminated.clone(),
            agents: self
                .agents
                .iter()
                .map(|a| AgentOutcome {
                    name: a.name.clone(),
                    behavior: a.agent.behavior(),
                    position: self.agent_position(&a.name),
                })
                .collect(),
        }
    }

    fn emit_scripted_noises(&mut self, now: SimTime) {
        while let Some(spec) = self.noises.get(self.next_noise) {
            if spec.time > now {
                break;
            }
            self.next_noise += 1;

            let emitted = if spec.throw {
                Some(self.emitter.emit_throw(&mut self.noise, spec.position))
            } else if let Some(gait) = spec.gait {
                self.emitter.emit_step(&mut self.noise, spec.position, gait)
            } else {
                let intensity = spec.intensity.unwrap_or(self.emitter.walk);
                Some(self.emitter.emit_at(&mut self.noise, spec.position, intensity))
            };

            if let Some(id) = emitted {
                self.noises_reported += 1;
                log::debug!("[{:>7.2}s] {} at {:?}", now, id, spec.position);
            }
        }
    }

    fn update_target(&mut self, now: SimTime) {
        let Some(spec) = &self.target else {
            return;
        };
        let Some((position, crouching)) = spec.sample(now) else {
            return;
        };

        if crouching != self.crouching {
            log::debug!("[{:>7.2}s] target {}", now, if crouching { "crouches" } else { "stands" });
        }
        self.crouching = crouching;
        self.target_state = Some(TargetState {
            id: TARGET_ID,
            position,
        });
        self.scene.move_entity(TARGET_ID, position);
    }

    fn sync_agent_bodies(&mut self) {
        for entry in &self.agents {
            let id = entry.agent.id();
            if let Some(position) = self.mover.position(id) {
                self.scene.move_entity(id, position + Vec3::UP * AGENT_BODY_HEIGHT);
            }
        }
    }

    fn deliver_light(&mut self, now: SimTime) {
        let Some((spec, light)) = &mut self.flashlight else {
            return;
        };

        if let Some((position, forward, enabled)) = spec.sample(now) {
            light.set_pose(position, forward);
            if light.enabled != enabled {
                light.toggle();
            }
        }

        let candidates: Vec<(EntityId, Vec3)> = self
            .agents
            .iter()
            .filter_map(|a| self.mover.position(a.agent.id()).map(|p| (a.agent.id(), p)))
            .collect();

        for lit in light.scan(candidates, &self.scene) {
            if let Some(entry) = self.agents.iter_mut().find(|a| a.agent.id() == lit.agent) {
                entry.agent.on_lit_by_light(now, lit.exposure);
            }
        }
    }

    fn tick_agents(&mut self, now: SimTime) {
        let crouching = self.crouching;
        let posture = move |_target: EntityId| crouching;

        for entry in &mut self.agents {
            let id = entry.agent.id();
            let (Some(position), Some(forward)) = (self.mover.position(id), self.mover.forward(id)) else {
                continue;
            };

            let ctx = TickContext {
                now,
                pose: AgentPose { position, forward },
                target: self.target_state,
                noise: &self.noise,
                occlusion: &self.scene,
                posture: &posture,
            };

            let mut victim = None;
            let mut eliminator = |target: EntityId| {
                log::info!("[{:>7.2}s] {} eliminated, resetting scene", now, target);
                victim = Some(target);
            };
            let report = entry.agent.tick(
                &ctx,
                &mut Actuators {
                    locomotion: &mut self.mover,
                    eliminator: &mut eliminator,
                },
            );

            if report.changed() {
                self.transitions += 1;
                log::info!(
                    "[{:>7.2}s] {} {} -> {}",
                    now,
                    entry.name,
                    report.before,
                    report.after
                );
            }

            if let Some(victim) = victim {
                self.eliminated = Some(Elimination {
                    victim,
                    by: entry.name.clone(),
                    at: now,
                });
                break;
            }
        }
    }
}
