//! Per-agent behavior arbitration
//!
//! Each tick runs the rules below in priority order. Once a rule puts
//! the agent into a fresh chase, the lower rules are skipped for that
//! tick.
//!
//! 1. proximity kill (independent of behavior)
//!    - agents that light freezes stop here while lit
//! 2. sustain or drop an ongoing chase
//! 3. vision or proximity escalation
//! 4. light escalation
//! 5. hearing: start or redirect an investigation
//! 6. patrol advance
//! 7. investigation arrival / timeout

use crate::clock::SimTime;
use crate::error::{AiError, Result};
use crate::kill::KillTrigger;
use crate::light::LightExposure;
use crate::locomotion::{has_arrived, Locomotion, INVESTIGATE_ARRIVAL_SLACK, PATROL_ARRIVAL_SLACK};
use crate::noise::{HeardNoise, NoiseId, NoiseLog};
use crate::profile::{AgentProfile, LightReaction};
use crate::services::{Eliminator, EntityId, Posture};
use crate::sight::{LineOfSight, Occlusion};
use crate::state::{AggroCause, Behavior, PerceptionState};
use umbra_math::Vec3;

/// Where the agent is and which way it faces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPose {
    pub position: Vec3,
    pub forward: Vec3,
}

/// The hunted character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetState {
    pub id: EntityId,
    pub position: Vec3,
}

/// Read-only world view for one tick
pub struct TickContext<'a> {
    pub now: SimTime,
    pub pose: AgentPose,
    /// None disables vision and proximity
    pub target: Option<TargetState>,
    pub noise: &'a NoiseLog,
    pub occlusion: &'a dyn Occlusion,
    pub posture: &'a dyn Posture,
}

/// Services the agent drives
pub struct Actuators<'a> {
    pub locomotion: &'a mut dyn Locomotion,
    pub eliminator: &'a mut dyn Eliminator,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub before: Behavior,
    pub after: Behavior,
    pub kill_armed: bool,
    pub kill_fired: Option<EntityId>,
    /// Held in place by light this tick
    pub frozen: bool,
    /// Last destination requested this tick
    pub destination: Option<Vec3>,
    pub heard: Option<NoiseId>,
}

impl TickReport {
    fn new(before: Behavior) -> Self {
        Self {
            before,
            after: before,
            kill_armed: false,
            kill_fired: None,
            frozen: false,
            destination: None,
            heard: None,
        }
    }

    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// One enemy: a profile, a patrol route and its perception state
#[derive(Debug, Clone)]
pub struct BehaviorAgent {
    id: EntityId,
    profile: AgentProfile,
    sight: LineOfSight,
    waypoints: Vec<Vec3>,
    state: PerceptionState,
    kill: KillTrigger,
    /// Light report accepted since the last tick
    pending_light: Option<LightExposure>,
}

impl BehaviorAgent {
    pub fn new(id: EntityId, profile: AgentProfile, waypoints: Vec<Vec3>) -> Result<Self> {
        profile.validate()?;
        if let Some(index) = waypoints.iter().position(|w| !w.is_finite()) {
            return Err(AiError::InvalidWaypoint { index });
        }
        if waypoints.is_empty() {
            log::warn!("Agent {} has no waypoints, patrol disabled", id);
        }

        Ok(Self {
            id,
            sight: profile.line_of_sight(),
            kill: KillTrigger::new(profile.kill_delay),
            profile,
            waypoints,
            state: PerceptionState::new(),
            pending_light: None,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn state(&self) -> &PerceptionState {
        &self.state
    }

    pub fn behavior(&self) -> Behavior {
        self.state.behavior
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    pub fn kill_trigger(&self) -> &KillTrigger {
        &self.kill
    }

    /// Place the agent on its route.
    ///
    /// Fails if the agent is off the walkable surface and cannot be
    /// snapped back onto it.
    pub fn start(&mut self, locomotion: &mut dyn Locomotion) -> Result<()> {
        if !locomotion.is_on_surface(self.id)
            && !locomotion.snap_to_surface(self.id, self.profile.surface_snap_radius)
        {
            log::error!("Agent {} is off the walkable surface", self.id);
            return Err(AiError::OffNavSurface { agent: self.id });
        }

        locomotion.set_speed(self.id, self.profile.patrol_speed);
        if let Some(&first) = self.waypoints.first() {
            locomotion.request_destination(self.id, first);
        }
        log::info!(
            "Agent {} started with {} waypoint(s), senses {:?}",
            self.id,
            self.waypoints.len(),
            self.profile.senses
        );
        Ok(())
    }

    /// Called by a light controller for every tick the agent is lit
    pub fn on_lit_by_light(&mut self, now: SimTime, exposure: LightExposure) {
        if !self.profile.senses.light {
            return;
        }
        self.state.last_lit_at = Some(now);
        if self.profile.light_reaction == LightReaction::Freeze {
            return;
        }

        let cooling_down = self
            .state
            .last_aggro_trigger_at
            .is_some_and(|at| now < at + self.profile.light_cooldown);
        if cooling_down {
            log::trace!("Agent {} lit during cooldown", self.id);
            return;
        }

        self.state.last_aggro_trigger_at = Some(now);
        self.pending_light = Some(exposure);
    }

    /// Run one decision step
    pub fn tick(&mut self, ctx: &TickContext<'_>, act: &mut Actuators<'_>) -> TickReport {
        let now = ctx.now;
        let mut report = TickReport::new(self.state.behavior);

        self.update_kill(ctx, act, &mut report);

        if self.update_freeze(ctx, act.locomotion, &mut report) {
            return report;
        }

        let sensed = self.observe(ctx);
        let mut escalated = false;

        if self.state.is_chasing() {
            if self.should_keep_chasing(ctx) {
                if let Some(target) = ctx.target {
                    let speed = self.chase_speed(ctx.pose.position, target.position);
                    self.go_to(act.locomotion, target.position, speed, &mut report);
                }
            } else {
                log::debug!("Agent {} lost the target", self.id);
                self.resume_patrol(act.locomotion, &mut report);
            }
        } else if let (Some(cause), Some(target)) = (sensed, ctx.target) {
            self.state
                .begin_chase(now, cause, self.profile.effective_chase_duration());
            let speed = self.chase_speed(ctx.pose.position, target.position);
            self.go_to(act.locomotion, target.position, speed, &mut report);
            escalated = true;
        }

        if let Some(exposure) = self.pending_light.take() {
            if !escalated {
                self.escalate_from_light(ctx, exposure, act.locomotion, &mut report);
            }
        }

        if !self.state.is_chasing() {
            let redirected = self.listen(ctx, act.locomotion, &mut report);
            match self.state.behavior {
                Behavior::Patrolling => self.advance_patrol(now, act.locomotion, &mut report),
                Behavior::Investigating => {
                    self.check_investigation(now, redirected, act.locomotion, &mut report)
                }
                Behavior::Chasing => {}
            }
        }

        report.after = self.state.behavior;
        report
    }

    fn update_kill(&mut self, ctx: &TickContext<'_>, act: &mut Actuators<'_>, report: &mut TickReport) {
        if let Some(target) = ctx.target {
            let in_range = ctx.pose.position.distance(target.position) <= self.profile.kill_range;
            if in_range && self.kill.arm(ctx.now, target.id) {
                report.kill_armed = true;
            }
        }

        if let Some(victim) = self.kill.poll(ctx.now) {
            log::info!("Agent {} eliminated {}", self.id, victim);
            act.eliminator.eliminate(victim);
            report.kill_fired = Some(victim);
        }
    }

    /// Light freeze rule. Returns true while the agent is held in place.
    fn update_freeze(
        &mut self,
        ctx: &TickContext<'_>,
        locomotion: &mut dyn Locomotion,
        report: &mut TickReport,
    ) -> bool {
        let held = self.profile.light_reaction == LightReaction::Freeze
            && self
                .state
                .last_lit_at
                .is_some_and(|at| ctx.now - at <= self.profile.sight_memory_window);

        if held {
            if !self.state.frozen {
                log::debug!("Agent {} frozen by light", self.id);
                self.state.frozen = true;
            }
            locomotion.stop(self.id);
            report.frozen = true;
            return true;
        }

        if self.state.frozen {
            log::debug!("Agent {} released from light", self.id);
            self.state.frozen = false;
            self.resume_route(locomotion, report);
        }
        false
    }

    /// Sight then proximity; records the contact time
    fn observe(&mut self, ctx: &TickContext<'_>) -> Option<AggroCause> {
        let target = ctx.target?;

        let cause = if self.profile.senses.sight
            && self.sight.can_see(
                ctx.occlusion,
                self.id,
                ctx.pose.position,
                ctx.pose.forward,
                target.id,
                target.position,
            ) {
            AggroCause::Sight
        } else if self.profile.senses.proximity
            && ctx.pose.position.distance(target.position) <= self.profile.detection_range
        {
            AggroCause::Proximity
        } else {
            return None;
        };

        log::trace!("Agent {} senses {} ({})", self.id, target.id, cause);
        self.state.last_seen_at = Some(ctx.now);
        Some(cause)
    }

    fn chase_speed(&self, position: Vec3, target: Vec3) -> f32 {
        if self.profile.senses.proximity {
            self.profile.proximity_chase_speed(position.distance(target))
        } else {
            self.profile.chase_speed
        }
    }

    fn should_keep_chasing(&self, ctx: &TickContext<'_>) -> bool {
        let now = ctx.now;
        let since_contact = self.state.last_contact().map(|at| now - at);

        let crouch_can_shake = match self.state.aggro_cause {
            AggroCause::Light => true,
            AggroCause::Sight => self.profile.crouch_drop_on_sight,
            AggroCause::None | AggroCause::Sound | AggroCause::Proximity => false,
        };
        if crouch_can_shake {
            if let Some(target) = ctx.target {
                let lost_long_enough =
                    since_contact.map_or(true, |elapsed| elapsed > self.profile.crouch_drop_delay);
                if lost_long_enough && ctx.posture.is_crouching(target.id) {
                    log::debug!("Agent {} shaken off by crouching {}", self.id, target.id);
                    return false;
                }
            }
        }

        let within_expiry = self.state.chase_expiry.is_some_and(|expiry| now < expiry);
        let remembered =
            since_contact.is_some_and(|elapsed| elapsed <= self.profile.sight_memory_window);
        within_expiry || remembered
    }

    fn escalate_from_light(
        &mut self,
        ctx: &TickContext<'_>,
        exposure: LightExposure,
        locomotion: &mut dyn Locomotion,
        report: &mut TickReport,
    ) {
        let duration = self.profile.effective_chase_duration();
        if self.state.is_chasing() {
            self.state.chase_expiry = Some(ctx.now + duration);
            return;
        }

        self.state.begin_chase(ctx.now, AggroCause::Light, duration);
        let destination = ctx.target.map_or(exposure.source, |t| t.position);
        let speed = self.chase_speed(ctx.pose.position, destination);
        self.go_to(locomotion, destination, speed, report);
    }

    /// Hearing rule. Returns true if a new noise set the investigation target.
    fn listen(&mut self, ctx: &TickContext<'_>, locomotion: &mut dyn Locomotion, report: &mut TickReport) -> bool {
        if !self.profile.senses.hearing {
            return false;
        }

        let heard = ctx.noise.query(
            self.profile.noise_policy,
            ctx.pose.position,
            self.profile.hearing_range,
            self.profile.hearing_threshold,
        );
        let Some(HeardNoise { id, position, .. }) = heard else {
            return false;
        };
        if self.state.last_heard_noise == Some(id) {
            return false;
        }

        self.state.last_heard_noise = Some(id);
        report.heard = Some(id);

        if self.state.transition(Behavior::Investigating) {
            self.state
                .investigate_deadline
                .schedule(ctx.now, self.profile.investigate_time);
            log::debug!("Agent {} investigating {} at {:?}", self.id, id, position);
        } else {
            log::debug!("Agent {} redirected to {} at {:?}", self.id, id, position);
        }

        self.state.investigate_target = Some(position);
        self.go_to(locomotion, position, self.profile.investigate_speed, report);
        true
    }

    fn advance_patrol(&mut self, now: SimTime, locomotion: &mut dyn Locomotion, report: &mut TickReport) {
        if self.waypoints.is_empty() {
            return;
        }

        if !self.state.patrol_dwell.is_pending() && has_arrived(locomotion, self.id, PATROL_ARRIVAL_SLACK) {
            self.state.patrol_dwell.schedule(now, self.profile.patrol_dwell);
        }

        if self.state.patrol_dwell.take_elapsed(now) {
            self.state.patrol_index = (self.state.patrol_index + 1) % self.waypoints.len();
            let next = self.waypoints[self.state.patrol_index];
            log::trace!("Agent {} heading to waypoint {}", self.id, self.state.patrol_index);
            self.go_to(locomotion, next, self.profile.patrol_speed, report);
        }
    }

    fn check_investigation(
        &mut self,
        now: SimTime,
        redirected: bool,
        locomotion: &mut dyn Locomotion,
        report: &mut TickReport,
    ) {
        let arrived = !redirected && has_arrived(locomotion, self.id, INVESTIGATE_ARRIVAL_SLACK);
        let timed_out = self.state.investigate_deadline.has_elapsed(now);
        if arrived || timed_out {
            log::debug!(
                "Agent {} done investigating ({})",
                self.id,
                if arrived { "arrived" } else { "timed out" }
            );
            self.resume_patrol(locomotion, report);
        }
    }

    /// Re-issue the destination of the current behavior after a stop
    fn resume_route(&mut self, locomotion: &mut dyn Locomotion, report: &mut TickReport) {
        match (self.state.behavior, self.state.investigate_target) {
            (Behavior::Investigating, Some(target)) => {
                self.go_to(locomotion, target, self.profile.investigate_speed, report)
            }
            // The chase rule re-targets later in the same tick
            (Behavior::Chasing, _) => {}
            _ => self.resume_patrol(locomotion, report),
        }
    }

    fn resume_patrol(&mut self, locomotion: &mut dyn Locomotion, report: &mut TickReport) {
        self.state.transition(Behavior::Patrolling);
        match self.waypoints.get(self.state.patrol_index) {
            Some(&waypoint) => self.go_to(locomotion, waypoint, self.profile.patrol_speed, report),
            None => locomotion.set_speed(self.id, self.profile.patrol_speed),
        }
    }

    fn go_to(&self, locomotion: &mut dyn Locomotion, position: Vec3, speed: f32, report: &mut TickReport) {
        locomotion.set_speed(self.id, speed);
        locomotion.request_destination(self.id, position);
        report.destination = Some(position);
    }
}
