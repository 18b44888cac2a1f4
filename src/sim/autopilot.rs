//! Demo-mode driver
//!
//! Produces held input for a session without a player: steers toward the
//! nearest lane with nothing coming down it and leaves the pedals alone.

use std::cmp::Ordering;

use super::input::TickInput;
use super::state::Session;
use crate::consts::*;

/// How far up the track the autopilot looks for threats
const LOOKAHEAD_START: f32 = 150.0;

/// Is anything about to reach the hit band in this lane?
fn lane_threatened(session: &Session, lane: f32) -> bool {
    session.obstacles().iter().any(|o| {
        (o.lane - lane).abs() < HIT_LANE_TOLERANCE
            && o.offset > LOOKAHEAD_START
            && o.offset < HIT_BAND_END
    })
}

/// Choose this tick's input
pub fn autopilot(session: &Session) -> TickInput {
    let car = session.car;
    let distance = |lane: f32| (lane - car.lane).abs();

    let target = LANES
        .iter()
        .copied()
        .filter(|&lane| !lane_threatened(session, lane))
        .min_by(|a, b| distance(*a).partial_cmp(&distance(*b)).unwrap_or(Ordering::Equal));

    let Some(target) = target else {
        // Every lane blocked: brake and hope
        return TickInput {
            decelerate: true,
            ..Default::default()
        };
    };

    let mut input = TickInput::default();
    if distance(target) >= STEER_STEP / 2.0 {
        if target < car.lane {
            input.left = true;
        } else {
            input.right = true;
        }
    }
    input
}
