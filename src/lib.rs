//! Crypto Racer - a pay-to-play lane racing game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (input, car physics, obstacles, collisions, session)
//! - `wallet`: Payment provider capability and the payment gate state machine
//! - `persistence`: Key-value store capability and its backends
//! - `highscores`: Best score and per-account leaderboard
//! - `platform`: Clock and the fixed-rate tick driver
//! - `settings`: Game/chain configuration

pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod wallet;

pub use game::{Game, GameError};
pub use highscores::{LeaderboardEntry, MAX_LEADERBOARD_ENTRIES};
pub use settings::GameConfig;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick interval (20 Hz)
    pub const TICK_INTERVAL_MS: u64 = 50;

    /// Track geometry (lane positions are percent of track width)
    pub const LANES: [f32; 3] = [20.0, 50.0, 80.0];
    pub const LANE_MIN: f32 = 20.0;
    pub const LANE_MAX: f32 = 80.0;
    pub const CAR_START_LANE: f32 = 50.0;
    /// Visible track length; obstacles at or past this offset are culled
    pub const TRACK_LENGTH: f32 = 600.0;

    /// Car handling per tick
    pub const STEER_STEP: f32 = 3.0;
    pub const ACCEL_STEP: f32 = 0.5;
    pub const CRUISE_STEP: f32 = 0.1;
    pub const SPEED_MIN: f32 = 3.0;
    pub const SPEED_MAX: f32 = 15.0;
    /// Auto-cruise never pushes past this without the accelerator held
    pub const CRUISE_MAX: f32 = 10.0;

    /// Obstacle spawning
    pub const SPAWN_CAP: usize = 5;
    pub const SPAWN_THRESHOLD: f32 = 0.95;
    pub const SPAWN_OFFSET: f32 = -50.0;
    pub const SEED_OBSTACLES: usize = 3;
    pub const SEED_BASE_OFFSET: f32 = -100.0;
    pub const SEED_SPACING: f32 = 300.0;

    /// Collision band on the track (exclusive) and lane tolerance
    pub const HIT_BAND_START: f32 = 350.0;
    pub const HIT_BAND_END: f32 = 450.0;
    pub const HIT_LANE_TOLERANCE: f32 = 10.0;

    /// Score margin for the "near personal best" banner
    pub const NEAR_BEST_MARGIN: u64 = 10;
}

/// Clamp a lane position to the drivable track
#[inline]
pub fn clamp_lane(lane: f32) -> f32 {
    lane.clamp(consts::LANE_MIN, consts::LANE_MAX)
}

/// Shorten a wallet address for display: `0x1234...abcd`
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten_address("0x78B212F2081468aFEE03F6c7f0b32f8E1aA12aFC"),
            "0x78B2...2aFC"
        );
        assert_eq!(shorten_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_clamp_lane() {
        assert_eq!(clamp_lane(10.0), 20.0);
        assert_eq!(clamp_lane(95.0), 80.0);
        assert_eq!(clamp_lane(47.0), 47.0);
    }
}
