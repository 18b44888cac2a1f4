//! Car handling: one physics step per tick

use serde::{Deserialize, Serialize};

use super::input::TickInput;
use crate::clamp_lane;
use crate::consts::*;

/// The player's car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Horizontal position (percent of track width, [20, 80])
    pub lane: f32,
    /// Forward speed in track units per tick ([3, 15])
    pub speed: f32,
}

impl Default for Car {
    fn default() -> Self {
        Self {
            lane: CAR_START_LANE,
            speed: SPEED_MIN,
        }
    }
}

impl Car {
    /// Compute the car's next position and speed from the held controls.
    ///
    /// Every rule reads the tick's starting values, so when both keys of a
    /// pair are held the later rule (right, decelerate) takes effect.
    pub fn step(self, input: &TickInput) -> Car {
        let mut next = self;

        if input.left {
            next.lane = clamp_lane(self.lane - STEER_STEP);
        }
        if input.right {
            next.lane = clamp_lane(self.lane + STEER_STEP);
        }

        if input.accelerate {
            next.speed = (self.speed + ACCEL_STEP).min(SPEED_MAX);
        }
        if input.decelerate {
            next.speed = (self.speed - ACCEL_STEP).max(SPEED_MIN);
        }
        if !input.accelerate && !input.decelerate {
            // Auto-cruise
            next.speed = (self.speed + CRUISE_STEP).min(CRUISE_MAX);
        }

        next.speed = next.speed.clamp(SPEED_MIN, SPEED_MAX);
        next
    }
}
