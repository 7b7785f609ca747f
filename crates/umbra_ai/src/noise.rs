//! Noise event log
//!
//! One log is shared by every noise producer and every listener in a
//! level. It is owned by whoever drives the tick and handed out by
//! reference: producers report into it, listeners query it, and
//! [`NoiseLog::expire`] runs once per tick before any query.

use crate::clock::SimTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use umbra_math::Vec3;

/// Default time a noise stays audible
pub const DEFAULT_NOISE_LIFETIME: f64 = 5.0;

/// Identity of a reported noise, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoiseId(pub u64);

impl fmt::Display for NoiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "noise#{}", self.0)
    }
}

/// A transient sound event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseEvent {
    pub id: NoiseId,
    pub position: Vec3,
    /// Uncalibrated loudness shared by convention across producers
    pub intensity: f32,
    pub created_at: SimTime,
}

/// How a listener picks among audible noises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoisePolicy {
    /// The newest qualifying noise wins, however quiet
    #[default]
    MostRecent,
    /// The noise with the highest `intensity / (1 + distance)` wins
    BestScored,
}

/// A noise a listener decided to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeardNoise {
    pub id: NoiseId,
    pub position: Vec3,
    pub intensity: f32,
}

impl From<&NoiseEvent> for HeardNoise {
    fn from(event: &NoiseEvent) -> Self {
        Self {
            id: event.id,
            position: event.position,
            intensity: event.intensity,
        }
    }
}

/// Append-only log of recent noises
#[derive(Debug, Clone)]
pub struct NoiseLog {
    /// Oldest first; creation times are non-decreasing
    events: VecDeque<NoiseEvent>,
    lifetime: f64,
    now: SimTime,
    next_id: u64,
}

impl NoiseLog {
    /// Create a log whose events live for `lifetime` seconds
    pub fn new(lifetime: f64) -> Self {
        Self {
            events: VecDeque::new(),
            lifetime: lifetime.max(0.0),
            now: 0.0,
            next_id: 0,
        }
    }

    /// Event lifetime in seconds
    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    /// The log's clock, as of the last [`expire`](Self::expire)
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Live events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &NoiseEvent> + '_ {
        self.events.iter()
    }

    /// Record a noise at the log's current time
    pub fn report(&mut self, position: Vec3, intensity: f32) -> NoiseId {
        let intensity = if intensity.is_finite() && intensity >= 0.0 {
            intensity
        } else {
            log::warn!("Clamping invalid noise intensity {} to 0", intensity);
            0.0
        };

        let id = NoiseId(self.next_id);
        self.next_id += 1;
        self.events.push_back(NoiseEvent {
            id,
            position,
            intensity,
            created_at: self.now,
        });
        log::trace!("{} reported at {:?} (intensity {})", id, position, intensity);
        id
    }

    /// Advance the log's clock to `now` and drop events older than the lifetime.
    ///
    /// Returns how many events were evicted.
    pub fn expire(&mut self, now: SimTime) -> usize {
        if now < self.now {
            log::warn!("Noise log clock went backwards ({} -> {}), ignoring", self.now, now);
        } else {
            self.now = now;
        }

        let before = self.events.len();
        while let Some(front) = self.events.front() {
            if self.is_expired(front) {
                self.events.pop_front();
            } else {
                break;
            }
        }
        before - self.events.len()
    }

    fn is_expired(&self, event: &NoiseEvent) -> bool {
        self.now - event.created_at > self.lifetime
    }

    fn qualifies(&self, event: &NoiseEvent, listener: Vec3, max_range: f32, min_intensity: f32) -> bool {
        !self.is_expired(event)
            && event.intensity >= min_intensity
            && listener.distance(event.position) <= max_range
    }

    /// The newest event within range and above the threshold
    pub fn query_most_recent(
        &self,
        listener: Vec3,
        max_range: f32,
        min_intensity: f32,
    ) -> Option<HeardNoise> {
        self.events
            .iter()
            .rev()
            .find(|event| self.qualifies(event, listener, max_range, min_intensity))
            .map(HeardNoise::from)
    }

    /// The event with the best distance-attenuated loudness
    pub fn query_best_scored(
        &self,
        listener: Vec3,
        max_range: f32,
        min_intensity: f32,
    ) -> Option<HeardNoise> {
        let mut best: Option<(f32, &NoiseEvent)> = None;
        for event in &self.events {
            if !self.qualifies(event, listener, max_range, min_intensity) {
                continue;
            }
            let score = event.intensity / (1.0 + listener.distance(event.position));
            // Ties keep the older event; zero-score noises are never heard
            if score > best.map_or(0.0, |(s, _)| s) {
                best = Some((score, event));
            }
        }
        best.map(|(_, event)| HeardNoise::from(event))
    }

    /// Query with the given policy
    pub fn query(
        &self,
        policy: NoisePolicy,
        listener: Vec3,
        max_range: f32,
        min_intensity: f32,
    ) -> Option<HeardNoise> {
        match policy {
            NoisePolicy::MostRecent => self.query_most_recent(listener, max_range, min_intensity),
            NoisePolicy::BestScored => self.query_best_scored(listener, max_range, min_intensity),
        }
    }
}

impl Default for NoiseLog {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_LIFETIME)
    }
}
