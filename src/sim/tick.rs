//! Fixed-rate simulation tick
//!
//! `tick` maps an immutable session snapshot plus the held input to the next
//! snapshot. The driver owns the single copy of the state and swaps it on
//! every tick, so there is never a stale closure over old values.

use super::collision::detect_collision;
use super::input::TickInput;
use super::state::{Session, SessionSummary};

/// Notable transitions produced by a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// The car hit an obstacle and the session ended
    Crashed {
        obstacle_id: u64,
        summary: SessionSummary,
    },
}

/// Compute the next session snapshot from `prev` and the held input
pub fn tick(prev: &Session, input: &TickInput) -> (Session, Option<GameEvent>) {
    let mut next = prev.clone();
    let event = advance(&mut next, input);
    (next, event)
}

/// In-place form of [`tick`]. Does nothing unless the session is active.
pub fn advance(state: &mut Session, input: &TickInput) -> Option<GameEvent> {
    if !state.is_active() {
        return None;
    }

    state.time_ticks += 1;

    state.car = state.car.step(input);
    let speed = state.car.speed;
    state.distance += f64::from(speed);
    state.score += speed.floor() as u64;

    // Collision is tested against where obstacles were before this tick moves them
    let hit = detect_collision(state.car.lane, state.field.obstacles());

    state.field.update(speed, &mut state.rng);

    hit.map(|obstacle_id| {
        log::debug!("Car hit obstacle {} at tick {}", obstacle_id, state.time_ticks);
        GameEvent::Crashed {
            obstacle_id,
            summary: state.end(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::SessionStatus;
    use proptest::prelude::*;

    /// An active session with no obstacles on the track
    fn clear_track(seed: u64) -> Session {
        let mut session = Session::new(seed, 0);
        session.start();
        session.field.clear();
        session
    }

    #[test]
    fn test_idle_and_ended_sessions_do_not_tick() {
        let idle = Session::new(5, 0);
        let (next, event) = tick(&idle, &TickInput::default());
        assert!(event.is_none());
        assert_eq!(next.status, SessionStatus::Idle);
        assert_eq!(next.time_ticks, 0);

        let mut ended = clear_track(5);
        ended.end();
        let (next, event) = tick(&ended, &TickInput::default());
        assert!(event.is_none());
        assert_eq!(next.score, ended.score);
        assert_eq!(next.distance, ended.distance);
    }

    #[test]
    fn test_tick_leaves_snapshot_untouched() {
        let session = clear_track(9);
        let (next, _) = tick(&session, &TickInput::default());
        assert_eq!(session.time_ticks, 0);
        assert_eq!(next.time_ticks, 1);
        assert!(next.car.speed > session.car.speed);
    }

    #[test]
    fn test_score_and_distance_accumulate_new_speed() {
        let mut session = clear_track(3);
        session.car.speed = 9.8;
        let (next, _) = tick(&session, &TickInput::default());
        // 9.8 + 0.1 cruise
        assert!((next.distance - 9.9).abs() < 1e-4);
        assert_eq!(next.score, 9);
    }

    #[test]
    fn test_collision_uses_previous_positions() {
        // Just short of the band: moves into it this tick but only hits next tick
        let mut session = clear_track(4);
        session.field.push(CAR_START_LANE, 349.0);
        let (session, event) = tick(&session, &TickInput::default());
        assert!(event.is_none());
        assert!(session.obstacles()[0].offset > HIT_BAND_START);

        let (session, event) = tick(&session, &TickInput::default());
        assert!(matches!(event, Some(GameEvent::Crashed { .. })));
        assert_eq!(session.status, SessionStatus::Ended);
    }

    #[test]
    fn test_collision_near_band_end_still_hits() {
        // Inside the band before moving, past it afterwards
        let mut session = clear_track(4);
        let id = session.field.push(CAR_START_LANE, 449.0);
        let (session, event) = tick(&session, &TickInput::default());
        match event {
            Some(GameEvent::Crashed { obstacle_id, summary }) => {
                assert_eq!(obstacle_id, id);
                assert_eq!(summary.score, session.score);
            }
            other => panic!("expected crash, got {:?}", other),
        }
    }

    #[test]
    fn test_steering_out_of_lane_avoids_hit() {
        let mut session = clear_track(8);
        session.car.lane = 41.0;
        session.field.push(50.0, 400.0);
        // Steering left puts the car at 38, more than 10 away from lane 50
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        let (session, event) = tick(&session, &input);
        assert!(event.is_none());
        assert_eq!(session.car.lane, 38.0);
    }

    #[test]
    fn test_crash_updates_best_score() {
        let mut session = Session::new(6, 100);
        session.start();
        session.field.clear();
        session.score = 148;
        session.field.push(CAR_START_LANE, 400.0);
        let (session, event) = tick(&session, &TickInput::default());

        let Some(GameEvent::Crashed { summary, .. }) = event else {
            panic!("expected crash");
        };
        assert_eq!(summary.score, 151);
        assert_eq!(summary.previous_best, 100);
        assert!(summary.is_new_best());
        assert!(summary.near_personal_best());
        assert_eq!(session.best_score, 151);
    }

    #[test]
    fn test_offsets_strictly_increase() {
        let mut session = clear_track(12);
        session.field.push(20.0, -300.0);
        session.car.lane = 80.0;
        for _ in 0..50 {
            let before = session.obstacles()[0];
            let (next, _) = tick(&session, &TickInput::default());
            let after = next
                .obstacles()
                .iter()
                .find(|o| o.id == before.id)
                .copied()
                .expect("obstacle should survive");
            assert!(after.offset > before.offset);
            session = next;
        }
    }

    proptest! {
        #[test]
        fn prop_session_invariants_hold(
            seed in any::<u64>(),
            inputs in proptest::collection::vec(any::<(bool, bool, bool, bool)>(), 1..300)
        ) {
            let mut session = Session::new(seed, 0);
            session.start();
            let mut expected_score = 0u64;

            for (left, right, accelerate, decelerate) in inputs {
                let input = TickInput { left, right, accelerate, decelerate };
                let (next, event) = tick(&session, &input);

                prop_assert!((LANE_MIN..=LANE_MAX).contains(&next.car.lane));
                prop_assert!((SPEED_MIN..=SPEED_MAX).contains(&next.car.speed));
                prop_assert!(next.distance >= session.distance);
                prop_assert!(next.score >= session.score);

                expected_score += next.car.speed.floor() as u64;
                prop_assert_eq!(next.score, expected_score);

                let mut ids: Vec<u64> = next.obstacles().iter().map(|o| o.id).collect();
                let count = ids.len();
                ids.sort_unstable();
                ids.dedup();
                prop_assert_eq!(ids.len(), count);

                session = next;
                if event.is_some() {
                    prop_assert_eq!(session.status, SessionStatus::Ended);
                    break;
                }
            }
        }
    }
}
