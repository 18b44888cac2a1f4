//! Car vs obstacle collision
//!
//! Coarse hitbox: an obstacle hits the car while it is inside a fixed band
//! of the track and close enough to the car's lane position.

use super::obstacles::Obstacle;
use crate::consts::*;

/// Is this obstacle inside the car's hit band (exclusive on both ends)?
#[inline]
pub fn in_hit_band(offset: f32) -> bool {
    offset > HIT_BAND_START && offset < HIT_BAND_END
}

/// Does this obstacle hit a car at `car_lane`?
#[inline]
pub fn obstacle_hits_car(car_lane: f32, obstacle: &Obstacle) -> bool {
    in_hit_band(obstacle.offset) && (obstacle.lane - car_lane).abs() < HIT_LANE_TOLERANCE
}

/// Find the first obstacle that hits the car, if any.
/// Several simultaneous hits end the session the same way as one.
pub fn detect_collision(car_lane: f32, obstacles: &[Obstacle]) -> Option<u64> {
    obstacles
        .iter()
        .find(|o| obstacle_hits_car(car_lane, o))
        .map(|o| o.id)
}
