//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only
//! - Seeded RNG only
//! - No wallet, storage or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod input;
pub mod obstacles;
pub mod physics;
pub mod state;
pub mod tick;

pub use autopilot::autopilot;
pub use collision::{detect_collision, in_hit_band, obstacle_hits_car};
pub use input::{Direction, InputTracker, KeyEvent, TickInput};
pub use obstacles::{Obstacle, ObstacleField, random_lane};
pub use physics::Car;
pub use state::{
    Session, SessionStatus, SessionSummary, beats_best, near_personal_best,
};
pub use tick::{GameEvent, advance, tick};
