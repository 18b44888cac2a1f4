//! Obstacle field: advance, cull and spawn
//!
//! Obstacles sit in one of the three lanes and scroll down the track at the
//! car's speed. Their order in the field only matters for rendering.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// An obstacle on the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    /// Lane position (one of `LANES`)
    pub lane: f32,
    /// Distance down the track; negative while still off-screen
    pub offset: f32,
}

/// Active obstacles plus the id allocator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    next_id: u64,
}

/// Pick a lane uniformly
pub fn random_lane<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    LANES[rng.random_range(0..LANES.len())]
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Remove every obstacle. Ids keep counting so they stay unique.
    pub fn clear(&mut self) {
        self.obstacles.clear();
    }

    /// Append an obstacle and return its id
    pub fn push(&mut self, lane: f32, offset: f32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.obstacles.push(Obstacle { id, lane, offset });
        id
    }

    /// Pre-populate the field so it is non-empty as soon as a session starts
    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in 0..SEED_OBSTACLES {
            let lane = random_lane(rng);
            self.push(lane, SEED_BASE_OFFSET - i as f32 * SEED_SPACING);
        }
    }

    /// Scroll every obstacle down the track by `speed`
    pub fn advance(&mut self, speed: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.offset += speed;
        }
    }

    /// Drop obstacles that have left the visible track
    pub fn cull(&mut self) {
        self.obstacles.retain(|o| o.offset < TRACK_LENGTH);
    }

    /// Roll for a new obstacle at the top of the track.
    /// Only rolls while the field is below the spawn cap.
    pub fn maybe_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u64> {
        if self.obstacles.len() >= SPAWN_CAP {
            return None;
        }
        if rng.random::<f32>() > SPAWN_THRESHOLD {
            let lane = random_lane(rng);
            Some(self.push(lane, SPAWN_OFFSET))
        } else {
            None
        }
    }

    /// One tick of field movement: advance, cull, then spawn
    pub fn update<R: Rng + ?Sized>(&mut self, speed: f32, rng: &mut R) {
        self.advance(speed);
        self.cull();
        if let Some(id) = self.maybe_spawn(rng) {
            log::trace!("Spawned obstacle {}", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    #[test]
    fn test_seed_staggers_offsets() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut field = ObstacleField::new();
        field.seed(&mut rng);

        let offsets: Vec<f32> = field.obstacles().iter().map(|o| o.offset).collect();
        assert_eq!(offsets, vec![-100.0, -400.0, -700.0]);
        assert!(field.obstacles().iter().all(|o| LANES.contains(&o.lane)));
    }

    #[test]
    fn test_cull_at_track_length() {
        let mut field = ObstacleField::new();
        field.push(50.0, 599.0);
        field.push(20.0, 596.0);
        field.advance(1.0);
        field.cull();
        // 600.0 is off the track, 597.0 is not
        assert_eq!(field.len(), 1);
        assert_eq!(field.obstacles()[0].offset, 597.0);
    }

    #[test]
    fn test_no_spawn_at_cap() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = ObstacleField::new();
        for _ in 0..SPAWN_CAP {
            field.push(50.0, 0.0);
        }
        for _ in 0..1000 {
            assert!(field.maybe_spawn(&mut rng).is_none());
        }
    }

    #[test]
    fn test_spawn_cap_counts_after_cull() {
        let mut rng = Pcg32::seed_from_u64(21);

        // Full field that stays on the track never spawns
        let mut full = ObstacleField::new();
        for _ in 0..SPAWN_CAP {
            full.push(50.0, 0.0);
        }
        for _ in 0..1000 {
            full.update(0.0, &mut rng);
            assert_eq!(full.len(), SPAWN_CAP);
        }

        // One of five leaves the track this tick, freeing a slot
        let mut spawned = 0;
        for _ in 0..1000 {
            let mut field = ObstacleField::new();
            for _ in 0..SPAWN_CAP - 1 {
                field.push(50.0, 0.0);
            }
            field.push(20.0, 599.5);
            field.update(1.0, &mut rng);
            assert!(field.obstacles().iter().all(|o| o.offset < TRACK_LENGTH));
            if field.len() == SPAWN_CAP {
                assert_eq!(field.obstacles()[SPAWN_CAP - 1].offset, SPAWN_OFFSET);
                spawned += 1;
            } else {
                assert_eq!(field.len(), SPAWN_CAP - 1);
            }
        }
        assert!(spawned > 0);
    }

    #[test]
    fn test_spawn_rate_is_rare() {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut spawned = 0;
        for _ in 0..10_000 {
            let mut field = ObstacleField::new();
            if field.maybe_spawn(&mut rng).is_some() {
                spawned += 1;
                assert_eq!(field.obstacles()[0].offset, SPAWN_OFFSET);
            }
        }
        // ~5% chance per roll
        assert!((300..700).contains(&spawned), "spawned {}", spawned);
    }

    #[test]
    fn test_ids_unique_across_clear() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut field = ObstacleField::new();
        let mut seen = HashSet::new();
        for _ in 0..50 {
            field.seed(&mut rng);
            for o in field.obstacles() {
                assert!(seen.insert(o.id));
            }
            field.clear();
        }
    }

    #[test]
    fn test_every_obstacle_culled_at_min_speed() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut field = ObstacleField::new();
        field.seed(&mut rng);
        let seeded: Vec<u64> = field.obstacles().iter().map(|o| o.id).collect();

        // Slowest obstacle starts at -700 and needs (600 + 700) / 3 ticks
        let bound = ((TRACK_LENGTH - (-700.0)) / SPEED_MIN).ceil() as usize + 1;
        for _ in 0..bound {
            field.update(SPEED_MIN, &mut rng);
        }
        assert!(field.obstacles().iter().all(|o| !seeded.contains(&o.id)));
    }
}
