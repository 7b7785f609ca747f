//! Behavior arbitration tests for umbra_ai
//!
//! Each agent runs against a scripted locomotion fake so arrival and
//! path state are fully controlled by the test.

use approx::assert_relative_eq;
use umbra_ai::prelude::*;
use umbra_math::{Vec3, AABB};

const AGENT: EntityId = EntityId(1);
const PLAYER: EntityId = EntityId(2);

const A: Vec3 = Vec3::new(0.0, 0.0, 10.0);
const B: Vec3 = Vec3::new(10.0, 0.0, 10.0);

/// Records every request and reports whatever the test scripts
struct FakeLocomotion {
    destinations: Vec<Vec3>,
    speed: f32,
    pending: bool,
    remaining: f32,
    tolerance: f32,
    on_surface: bool,
    can_snap: bool,
    stops: usize,
}

impl Default for FakeLocomotion {
    fn default() -> Self {
        Self {
            destinations: Vec::new(),
            speed: 0.0,
            pending: false,
            remaining: 100.0,
            tolerance: 0.1,
            on_surface: true,
            can_snap: false,
            stops: 0,
        }
    }
}

impl FakeLocomotion {
    fn last_destination(&self) -> Option<Vec3> {
        self.destinations.last().copied()
    }
}

impl Locomotion for FakeLocomotion {
    fn request_destination(&mut self, _agent: EntityId, position: Vec3) {
        self.destinations.push(position);
    }

    fn set_speed(&mut self, _agent: EntityId, speed: f32) {
        self.speed = speed;
    }

    fn is_path_pending(&self, _agent: EntityId) -> bool {
        self.pending
    }

    fn remaining_distance(&self, _agent: EntityId) -> f32 {
        self.remaining
    }

    fn stopping_tolerance(&self, _agent: EntityId) -> f32 {
        self.tolerance
    }

    fn stop(&mut self, _agent: EntityId) {
        self.stops += 1;
    }

    fn is_on_surface(&self, _agent: EntityId) -> bool {
        self.on_surface
    }

    fn snap_to_surface(&mut self, _agent: EntityId, _radius: f32) -> bool {
        if self.can_snap {
            self.on_surface = true;
        }
        self.can_snap
    }
}

/// One agent plus everything it talks to
struct Rig {
    agent: BehaviorAgent,
    noise: NoiseLog,
    scene: ColliderScene,
    loco: FakeLocomotion,
    pose: AgentPose,
    crouching: bool,
    kills: Vec<EntityId>,
}

impl Rig {
    fn new(profile: AgentProfile, waypoints: Vec<Vec3>) -> Self {
        let mut rig = Self {
            agent: BehaviorAgent::new(AGENT, profile, waypoints).unwrap(),
            noise: NoiseLog::default(),
            scene: ColliderScene::new(),
            loco: FakeLocomotion::default(),
            pose: AgentPose {
                position: Vec3::ZERO,
                forward: Vec3::Z,
            },
            crouching: false,
            kills: Vec::new(),
        };
        rig.agent.start(&mut rig.loco).unwrap();
        rig
    }

    fn noise_at(&mut self, now: f64, position: Vec3, intensity: f32) -> NoiseId {
        self.noise.expire(now);
        self.noise.report(position, intensity)
    }

    fn lit(&mut self, now: f64, source: Vec3) {
        self.agent.on_lit_by_light(now, LightExposure::new(source, 1.0));
    }

    fn tick(&mut self, now: f64, target: Option<Vec3>) -> TickReport {
        self.noise.expire(now);
        let crouching = self.crouching;
        let posture = move |_target: EntityId| crouching;
        let ctx = TickContext {
            now,
            pose: self.pose,
            target: target.map(|position| TargetState { id: PLAYER, position }),
            noise: &self.noise,
            occlusion: &self.scene,
            posture: &posture,
        };
        let kills = &mut self.kills;
        let mut eliminator = |victim: EntityId| kills.push(victim);
        self.agent.tick(
            &ctx,
            &mut Actuators {
                locomotion: &mut self.loco,
                eliminator: &mut eliminator,
            },
        )
    }
}

/// Somewhere behind the agent, out of view and out of kill range
fn behind() -> Option<Vec3> {
    Some(Vec3::new(0.0, 0.0, -8.0))
}

/// Straight ahead, in view but out of kill range
fn ahead() -> Option<Vec3> {
    Some(Vec3::new(0.0, 0.0, 8.0))
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

#[test]
fn test_start_heads_to_first_waypoint() {
    let rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    assert_eq!(rig.loco.destinations, vec![A]);
    assert_eq!(rig.loco.speed, rig.agent.profile().patrol_speed);
    assert_eq!(rig.agent.behavior(), Behavior::Patrolling);
}

#[test]
fn test_start_off_surface_is_an_error() {
    let mut agent = BehaviorAgent::new(AGENT, AgentProfile::listener(), vec![A]).unwrap();
    let mut loco = FakeLocomotion {
        on_surface: false,
        ..Default::default()
    };
    assert!(matches!(agent.start(&mut loco), Err(AiError::OffNavSurface { agent: AGENT })));
    assert!(loco.destinations.is_empty());
}

#[test]
fn test_start_snaps_onto_surface() {
    let mut agent = BehaviorAgent::new(AGENT, AgentProfile::listener(), vec![A]).unwrap();
    let mut loco = FakeLocomotion {
        on_surface: false,
        can_snap: true,
        ..Default::default()
    };
    assert!(agent.start(&mut loco).is_ok());
    assert_eq!(loco.destinations, vec![A]);
}

// ---------------------------------------------------------------------------
// Hearing and investigation
// ---------------------------------------------------------------------------

#[test]
fn test_noise_starts_investigation_same_tick() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    let p = Vec3::new(5.0, 0.0, 3.0);
    let id = rig.noise_at(1.0, p, 1.0);

    let report = rig.tick(1.0, None);
    assert_eq!(report.after, Behavior::Investigating);
    assert_eq!(report.heard, Some(id));
    assert_eq!(rig.agent.state().investigate_target, Some(p));
    assert_eq!(rig.agent.state().last_heard_noise, Some(id));
    assert_eq!(rig.loco.last_destination(), Some(p));
    assert_eq!(rig.loco.speed, rig.agent.profile().investigate_speed);
}

#[test]
fn test_quiet_or_distant_noise_is_ignored() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    rig.noise_at(1.0, Vec3::new(1.0, 0.0, 0.0), 0.3);
    rig.noise_at(1.0, Vec3::new(40.0, 0.0, 0.0), 5.0);

    let report = rig.tick(1.0, None);
    assert_eq!(report.after, Behavior::Patrolling);
    assert_eq!(report.heard, None);
}

#[test]
fn test_same_noise_is_acted_on_once() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    rig.noise_at(1.0, Vec3::new(5.0, 0.0, 3.0), 1.0);
    rig.tick(1.0, None);
    let requests = rig.loco.destinations.len();

    let report = rig.tick(1.1, None);
    assert_eq!(report.heard, None);
    assert_eq!(rig.loco.destinations.len(), requests);
}

#[test]
fn test_investigation_times_out_without_arrival() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    rig.noise_at(0.1, Vec3::new(15.0, 0.0, 0.0), 1.0);
    rig.tick(0.1, None);
    assert_eq!(rig.agent.behavior(), Behavior::Investigating);

    let investigate_time = rig.agent.profile().investigate_time;
    let step = 0.1;
    let mut ended_at = None;
    for i in 2..100 {
        let now = i as f64 * step;
        if rig.tick(now, None).after == Behavior::Patrolling {
            ended_at = Some(now);
            break;
        }
    }

    let ended_at = ended_at.unwrap();
    assert!(ended_at <= 0.1 + investigate_time + step + 1e-9);
    assert!(ended_at >= 0.1 + investigate_time - 1e-9);
    // Resumes the waypoint it was heading to
    assert_eq!(rig.loco.last_destination(), Some(A));
    assert_eq!(rig.loco.speed, rig.agent.profile().patrol_speed);
}

#[test]
fn test_redirect_keeps_original_deadline() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    rig.noise_at(0.0, Vec3::new(15.0, 0.0, 0.0), 1.0);
    rig.tick(0.0, None);

    let second = Vec3::new(-15.0, 0.0, 0.0);
    rig.noise_at(2.0, second, 1.0);
    let report = rig.tick(2.0, None);
    assert_eq!(report.after, Behavior::Investigating);
    assert_eq!(rig.agent.state().investigate_target, Some(second));
    assert_eq!(rig.loco.last_destination(), Some(second));

    assert_eq!(rig.tick(3.9, None).after, Behavior::Investigating);
    assert_eq!(rig.tick(4.0, None).after, Behavior::Patrolling);
}

#[test]
fn test_arrival_at_superseded_target_does_not_end_investigation() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    rig.noise_at(0.0, Vec3::new(3.0, 0.0, 0.0), 1.0);
    rig.tick(0.0, None);

    // Reaches the first noise just as a second one is heard
    rig.loco.remaining = 0.0;
    let second = Vec3::new(-10.0, 0.0, 0.0);
    rig.noise_at(1.0, second, 1.0);
    assert_eq!(rig.tick(1.0, None).after, Behavior::Investigating);

    rig.loco.remaining = 10.0;
    assert_eq!(rig.tick(1.1, None).after, Behavior::Investigating);

    rig.loco.remaining = 0.3;
    assert_eq!(rig.tick(2.0, None).after, Behavior::Patrolling);
}

#[test]
fn test_pending_path_is_not_arrival() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    rig.noise_at(0.0, Vec3::new(3.0, 0.0, 0.0), 1.0);
    rig.tick(0.0, None);

    rig.loco.remaining = 0.0;
    rig.loco.pending = true;
    assert_eq!(rig.tick(0.5, None).after, Behavior::Investigating);
    rig.loco.pending = false;
    assert_eq!(rig.tick(0.6, None).after, Behavior::Patrolling);
}

#[test]
fn test_best_scored_listener_prefers_effective_loudness() {
    let mut rig = Rig::new(AgentProfile::scored_listener(), vec![A]);
    let near = Vec3::new(1.0, 0.0, 0.0);
    let loud_far = Vec3::new(15.0, 0.0, 0.0);
    rig.noise_at(0.0, near, 1.0);
    rig.noise_at(0.0, loud_far, 3.0);

    rig.tick(0.0, None);
    assert_eq!(rig.agent.state().investigate_target, Some(near));
}

#[test]
fn test_hearing_works_without_target() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![]);
    rig.noise_at(0.0, Vec3::new(4.0, 0.0, 0.0), 1.0);
    assert_eq!(rig.tick(0.0, None).after, Behavior::Investigating);
}

// ---------------------------------------------------------------------------
// Patrol
// ---------------------------------------------------------------------------

#[test]
fn test_patrol_dwells_then_cycles() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    rig.loco.remaining = 0.0;

    rig.tick(0.0, None);
    assert!(rig.agent.state().patrol_dwell.is_pending());
    rig.tick(1.0, None);
    assert_eq!(rig.loco.last_destination(), Some(A));

    let report = rig.tick(1.5, None);
    assert_eq!(report.destination, Some(B));
    assert_eq!(rig.agent.state().patrol_index, 1);

    rig.tick(1.6, None);
    rig.tick(3.2, None);
    assert_eq!(rig.agent.state().patrol_index, 0);
    assert_eq!(rig.loco.last_destination(), Some(A));
}

#[test]
fn test_patrol_waits_for_arrival() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A, B]);
    rig.loco.remaining = 0.2;
    for i in 0..50 {
        rig.tick(i as f64 * 0.1, None);
    }
    assert_eq!(rig.agent.state().patrol_index, 0);
    assert_eq!(rig.loco.destinations, vec![A]);
}

#[test]
fn test_zero_dwell_advances_on_arrival_tick() {
    let profile = AgentProfile {
        patrol_dwell: 0.0,
        ..AgentProfile::listener()
    };
    let mut rig = Rig::new(profile, vec![A, B]);
    rig.loco.remaining = 0.0;

    assert_eq!(rig.tick(0.0, None).destination, Some(B));
}

// ---------------------------------------------------------------------------
// Vision
// ---------------------------------------------------------------------------

#[test]
fn test_sight_interrupts_investigation() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.noise_at(0.0, Vec3::new(4.0, 0.0, 0.0), 1.0);
    rig.tick(0.0, behind());
    assert_eq!(rig.agent.behavior(), Behavior::Investigating);

    let report = rig.tick(0.5, ahead());
    assert_eq!(report.after, Behavior::Chasing);
    assert_eq!(rig.agent.state().aggro_cause, AggroCause::Sight);
    assert_eq!(rig.loco.last_destination(), ahead());
    assert_eq!(rig.loco.speed, rig.agent.profile().chase_speed);
    assert!(!rig.agent.state().investigate_deadline.is_pending());
}

#[test]
fn test_listener_is_blind() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A]);
    assert_eq!(rig.tick(0.0, ahead()).after, Behavior::Patrolling);
}

#[test]
fn test_chase_follows_live_target() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.tick(0.0, ahead());

    let moved = Some(Vec3::new(3.0, 0.0, 9.0));
    let report = rig.tick(0.1, moved);
    assert_eq!(report.after, Behavior::Chasing);
    assert_eq!(report.destination, moved);
}

#[test]
fn test_chase_ignores_noise() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.tick(0.0, ahead());
    assert_eq!(rig.agent.behavior(), Behavior::Chasing);

    rig.noise_at(0.5, Vec3::new(-5.0, 0.0, 0.0), 5.0);
    let report = rig.tick(0.5, ahead());
    assert_eq!(report.after, Behavior::Chasing);
    assert_eq!(report.heard, None);
    assert_eq!(rig.loco.last_destination(), ahead());
}

#[test]
fn test_sight_chase_decays_after_expiry_and_memory() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.tick(0.0, ahead());

    // Out of view from here on; expiry holds the chase
    assert_eq!(rig.tick(0.1, behind()).after, Behavior::Chasing);
    assert_eq!(rig.tick(4.9, behind()).after, Behavior::Chasing);

    let report = rig.tick(5.0, behind());
    assert_eq!(report.after, Behavior::Patrolling);
    assert_eq!(rig.agent.state().aggro_cause, AggroCause::None);
    assert_eq!(rig.loco.last_destination(), Some(A));
}

#[test]
fn test_memory_window_outlasts_expiry() {
    let profile = AgentProfile {
        chase_duration: 0.5,
        ..AgentProfile::stalker()
    };
    let mut rig = Rig::new(profile, vec![A]);
    rig.tick(0.0, ahead());
    rig.tick(0.4, ahead());

    // Expiry passed at 0.5 but the target was seen at 0.4
    assert_eq!(rig.tick(0.9, behind()).after, Behavior::Chasing);
    assert_eq!(rig.tick(1.1, behind()).after, Behavior::Patrolling);
}

#[test]
fn test_crouching_does_not_shake_sight_chase_by_default() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.tick(0.0, ahead());
    rig.crouching = true;
    assert_eq!(rig.tick(2.0, behind()).after, Behavior::Chasing);
}

#[test]
fn test_crouch_drop_on_sight_when_enabled() {
    let profile = AgentProfile {
        crouch_drop_on_sight: true,
        ..AgentProfile::stalker()
    };
    let mut rig = Rig::new(profile, vec![A]);
    rig.tick(0.0, ahead());
    rig.crouching = true;
    assert_eq!(rig.tick(0.9, behind()).after, Behavior::Chasing);
    assert_eq!(rig.tick(1.1, behind()).after, Behavior::Patrolling);
}

// ---------------------------------------------------------------------------
// Light
// ---------------------------------------------------------------------------

#[test]
fn test_light_report_starts_chase() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.lit(1.0, Vec3::new(0.0, 1.0, -6.0));

    let report = rig.tick(1.0, behind());
    assert_eq!(report.after, Behavior::Chasing);
    assert_eq!(rig.agent.state().aggro_cause, AggroCause::Light);
    assert_eq!(rig.agent.state().last_lit_at, Some(1.0));
    assert_eq!(report.destination, behind());
}

#[test]
fn test_light_without_target_heads_to_source() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    let source = Vec3::new(3.0, 1.0, -2.0);
    rig.lit(1.0, source);
    assert_eq!(rig.tick(1.0, None).destination, Some(source));
}

#[test]
fn test_two_reports_in_one_tick_trigger_once() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.lit(1.0, Vec3::new(0.0, 1.0, -6.0));
    rig.lit(1.0, Vec3::new(0.0, 1.0, -6.0));
    assert_eq!(rig.agent.state().last_aggro_trigger_at, Some(1.0));

    let report = rig.tick(1.0, behind());
    assert!(report.changed());
    assert_eq!(report.after, Behavior::Chasing);

    // Nothing left pending for the next tick
    let report = rig.tick(1.05, behind());
    assert!(!report.changed());
}

#[test]
fn test_light_cooldown_limits_retriggers() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.lit(1.0, Vec3::ZERO);
    rig.tick(1.0, behind());

    rig.lit(1.1, Vec3::ZERO);
    assert_eq!(rig.agent.state().last_aggro_trigger_at, Some(1.0));
    assert_eq!(rig.agent.state().last_lit_at, Some(1.1));

    rig.lit(1.5, Vec3::ZERO);
    assert_eq!(rig.agent.state().last_aggro_trigger_at, Some(1.5));
}

#[test]
fn test_light_refresh_keeps_sight_cause() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.tick(0.0, ahead());
    assert_eq!(rig.agent.state().aggro_cause, AggroCause::Sight);

    rig.lit(2.0, Vec3::ZERO);
    rig.tick(2.0, behind());
    assert_eq!(rig.agent.state().aggro_cause, AggroCause::Sight);
    assert_eq!(rig.agent.state().chase_expiry, Some(7.0));
}

#[test]
fn test_crouch_out_of_light_drops_chase_early() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A, B]);
    rig.lit(1.0, Vec3::ZERO);
    rig.tick(1.0, behind());
    let expiry = rig.agent.state().chase_expiry.unwrap();

    // Target crouches and leaves the light at t = 1.0
    rig.crouching = true;
    assert_eq!(rig.tick(1.5, behind()).after, Behavior::Chasing);
    assert_eq!(rig.tick(1.9, behind()).after, Behavior::Chasing);

    let now = 2.1;
    assert!(now < expiry);
    let report = rig.tick(now, behind());
    assert_eq!(report.after, Behavior::Patrolling);
    assert_eq!(rig.agent.state().aggro_cause, AggroCause::None);
    assert_eq!(report.destination, Some(A));
}

#[test]
fn test_standing_target_keeps_light_chase_until_expiry() {
    let mut rig = Rig::new(AgentProfile::stalker(), vec![A]);
    rig.lit(1.0, Vec3::ZERO);
    rig.tick(1.0, behind());

    assert_eq!(rig.tick(3.0, behind()).after, Behavior::Chasing);
    assert_eq!(rig.tick(5.9, behind()).after, Behavior::Chasing);
    assert_eq!(rig.tick(6.1, behind()).after, Behavior::Patrolling);
}

#[test]
fn test_listener_ignores_light() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A]);
    rig.lit(1.0, Vec3::ZERO);
    assert_eq!(rig.tick(1.0, behind()).after, Behavior::Patrolling);
}

// ---------------------------------------------------------------------------
// Kill
// ---------------------------------------------------------------------------

#[test]
fn test_kill_fires_once_after_delay() {
    let profile = AgentProfile {
        kill_delay: 0.25,
        ..AgentProfile::listener()
    };
    let mut rig = Rig::new(profile, vec![A]);
    let close = Some(Vec3::new(0.5, 0.0, 0.5));

    let report = rig.tick(1.0, close);
    assert!(report.kill_armed);
    assert!(rig.kills.is_empty());

    assert_eq!(rig.tick(1.125, close).kill_fired, None);
    assert_eq!(rig.tick(1.25, close).kill_fired, Some(PLAYER));
    assert_eq!(rig.kills, vec![PLAYER]);

    for i in 0..10 {
        let report = rig.tick(1.5 + i as f64 * 0.1, close);
        assert!(!report.kill_armed);
        assert_eq!(report.kill_fired, None);
    }
    assert_eq!(rig.kills.len(), 1);
}

#[test]
fn test_kill_reentering_range_does_not_rearm() {
    let profile = AgentProfile {
        kill_delay: 0.25,
        ..AgentProfile::listener()
    };
    let mut rig = Rig::new(profile, vec![A]);
    let close = Some(Vec3::new(0.5, 0.0, 0.5));
    let away = Some(Vec3::new(0.0, 0.0, -8.0));

    assert!(rig.tick(1.0, close).kill_armed);
    assert!(!rig.tick(1.0625, away).kill_armed);
    assert!(!rig.tick(1.125, close).kill_armed);
    assert!(!rig.tick(1.1875, away).kill_armed);
    assert!(rig.kills.is_empty());

    // Still keyed to the first entry, not the latest one
    let report = rig.tick(1.25, close);
    assert!(!report.kill_armed);
    assert_eq!(report.kill_fired, Some(PLAYER));

    for i in 0..6 {
        let target = if i % 2 == 0 { away } else { close };
        let report = rig.tick(1.5 + i as f64 * 0.1, target);
        assert!(!report.kill_armed);
        assert_eq!(report.kill_fired, None);
    }
    assert_eq!(rig.kills, vec![PLAYER]);
}

#[test]
fn test_kill_fires_even_if_target_escapes() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A]);
    rig.tick(0.0, Some(Vec3::new(1.0, 0.0, 0.0)));
    rig.tick(0.5, Some(Vec3::new(30.0, 0.0, 0.0)));
    assert_eq!(rig.kills, vec![PLAYER]);
}

#[test]
fn test_no_target_no_kill() {
    let mut rig = Rig::new(AgentProfile::listener(), vec![A]);
    for i in 0..10 {
        assert!(!rig.tick(i as f64 * 0.1, None).kill_armed);
    }
    assert!(rig.kills.is_empty());
}

// ---------------------------------------------------------------------------
// Proximity hunter
// ---------------------------------------------------------------------------

#[test]
fn test_proximity_ignores_cone_and_walls() {
    let mut rig = Rig::new(AgentProfile::kari(), vec![A]);
    rig.scene.add_box(
        EntityId(50),
        AABB::new(Vec3::new(-3.0, 0.0, -4.5), Vec3::new(3.0, 3.0, -4.0)),
    );

    let report = rig.tick(0.0, behind());
    assert_eq!(report.after, Behavior::Chasing);
    assert_eq!(rig.agent.state().aggro_cause, AggroCause::Proximity);
    assert_eq!(report.destination, behind());
}

#[test]
fn test_proximity_range_limits_detection() {
    let mut rig = Rig::new(AgentProfile::kari(), vec![A]);
    assert_eq!(rig.tick(0.0, Some(Vec3::new(0.0, 0.0, 16.0))).after, Behavior::Patrolling);
    assert_eq!(rig.tick(0.1, Some(Vec3::new(0.0, 0.0, 15.0))).after, Behavior::Chasing);
}

#[test]
fn test_proximity_chase_speeds_up_when_close() {
    let mut rig = Rig::new(AgentProfile::kari(), vec![A]);
    rig.tick(0.0, Some(Vec3::new(0.0, 0.0, 12.0)));
    assert_relative_eq!(rig.loco.speed, 4.2, epsilon = 1e-4);

    rig.tick(0.1, Some(Vec3::new(0.0, 0.0, 3.0)));
    assert_relative_eq!(rig.loco.speed, 7.8, epsilon = 1e-4);
}

#[test]
fn test_proximity_chase_drops_out_of_range() {
    let mut rig = Rig::new(AgentProfile::kari(), vec![A]);
    rig.tick(0.0, behind());

    let far = Some(Vec3::new(0.0, 0.0, -30.0));
    assert_eq!(rig.tick(0.4, far).after, Behavior::Chasing);
    let report = rig.tick(0.7, far);
    assert_eq!(report.after, Behavior::Patrolling);
    assert_eq!(report.destination, Some(A));
}

#[test]
fn test_crouching_does_not_shake_proximity_chase() {
    let mut rig = Rig::new(AgentProfile::kari(), vec![A]);
    rig.tick(0.0, behind());
    rig.crouching = true;
    assert_eq!(rig.tick(2.0, behind()).after, Behavior::Chasing);
}

#[test]
fn test_light_freezes_instead_of_provoking() {
    let mut rig = Rig::new(AgentProfile::kari(), vec![A, B]);
    rig.lit(1.0, Vec3::new(0.0, 1.0, -6.0));
    assert!(rig.agent.state().last_aggro_trigger_at.is_none());

    let report = rig.tick(1.0, behind());
    assert!(report.frozen);
    assert_eq!(report.after, Behavior::Patrolling);
    assert_eq!(report.destination, None);
    assert_eq!(rig.loco.stops, 1);
    assert!(rig.agent.state().frozen);

    // Held while the light keeps landing
    for i in 1..5 {
        let now = 1.0 + i as f64 * 0.1;
        rig.lit(now, Vec3::new(0.0, 1.0, -6.0));
        assert!(rig.tick(now, behind()).frozen);
    }
    assert_eq!(rig.agent.behavior(), Behavior::Patrolling);
}

#[test]
fn test_freeze_releases_after_memory_window() {
    let mut rig = Rig::new(AgentProfile::kari(), vec![A, B]);
    rig.lit(1.0, Vec3::ZERO);
    rig.tick(1.0, None);

    // Light gone at 1.0; held for the memory window
    assert!(rig.tick(1.5, None).frozen);
    let report = rig.tick(1.7, None);
    assert!(!report.frozen);
    assert!(!rig.agent.state().frozen);
    assert_eq!(report.destination, Some(A));
    assert_eq!(rig.loco.speed, rig.agent.profile().patrol_speed);
}

#[test]
fn test_released_agent_hunts_nearby_target() {
    let mut rig = Rig::new(AgentProfile::kari(), vec![A]);
    rig.lit(1.0, Vec3::ZERO);
    assert_eq!(rig.tick(1.0, behind()).after, Behavior::Patrolling);

    let report = rig.tick(1.7, behind());
    assert_eq!(report.after, Behavior::Chasing);
    assert_eq!(report.destination, behind());
}

#[test]
fn test_frozen_agent_still_kills_on_contact() {
    let profile = AgentProfile {
        kill_delay: 0.25,
        ..AgentProfile::kari()
    };
    let mut rig = Rig::new(profile, vec![A]);
    let close = Some(Vec3::new(0.5, 0.0, 0.5));

    rig.lit(1.0, Vec3::ZERO);
    assert!(rig.tick(1.0, close).kill_armed);
    rig.lit(1.25, Vec3::ZERO);
    let report = rig.tick(1.25, close);
    assert!(report.frozen);
    assert_eq!(report.kill_fired, Some(PLAYER));
}
