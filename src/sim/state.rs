//! Session state and core simulation types
//!
//! Everything the tick function reads or writes lives in one `Session`
//! aggregate, so `start` and the crash transition reset or freeze all of it
//! at once.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacles::{Obstacle, ObstacleField};
use super::physics::Car;
use crate::consts::NEAR_BEST_MARGIN;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Nothing played yet
    #[default]
    Idle,
    /// Ticking
    Active,
    /// Crashed; frozen until the next start
    Ended,
}

/// Result of a finished session, handed to score persistence and the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u64,
    pub distance: f64,
    pub ticks: u64,
    /// Best score before this session ended
    pub previous_best: u64,
}

impl SessionSummary {
    /// Should the best score be replaced (and persisted)?
    pub fn is_new_best(&self) -> bool {
        beats_best(self.score, self.previous_best)
    }

    /// UI banner condition, evaluated against the best from before this session
    pub fn near_personal_best(&self) -> bool {
        near_personal_best(self.score, self.previous_best)
    }
}

/// Persistence rule: strictly greater, never on ties
#[inline]
pub fn beats_best(score: u64, best: u64) -> bool {
    score > best
}

/// Display heuristic: `score > previous_best - 10`
#[inline]
pub fn near_personal_best(score: u64, previous_best: u64) -> bool {
    score.saturating_add(NEAR_BEST_MARGIN) > previous_best
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct Session {
    pub status: SessionStatus,
    pub car: Car,
    pub field: ObstacleField,
    /// Track units travelled this session
    pub distance: f64,
    pub score: u64,
    pub best_score: u64,
    /// Ticks simulated this session
    pub time_ticks: u64,
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
}

impl Session {
    /// Create an idle session with a known best score
    pub fn new(seed: u64, best_score: u64) -> Self {
        Self {
            status: SessionStatus::Idle,
            car: Car::default(),
            field: ObstacleField::new(),
            distance: 0.0,
            score: 0,
            best_score,
            time_ticks: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.field.obstacles()
    }

    /// Reset every per-session value and enter `Active`.
    /// The best score and the RNG stream carry over.
    pub fn start(&mut self) {
        self.car = Car::default();
        self.field.clear();
        self.distance = 0.0;
        self.score = 0;
        self.time_ticks = 0;
        self.field.seed(&mut self.rng);
        self.status = SessionStatus::Active;
        log::info!("Session started (best {})", self.best_score);
    }

    /// Freeze the session and fold the score into the best score
    pub fn end(&mut self) -> SessionSummary {
        let summary = SessionSummary {
            score: self.score,
            distance: self.distance,
            ticks: self.time_ticks,
            previous_best: self.best_score,
        };
        if summary.is_new_best() {
            self.best_score = self.score;
        }
        self.status = SessionStatus::Ended;
        log::info!(
            "Session ended: score {} distance {:.0} after {} ticks",
            summary.score,
            summary.distance,
            summary.ticks
        );
        summary
    }
}
