//! Difficulty curve
//!
//! Everything here is a pure function of score or level, so the whole
//! progression can be reasoned about (and tested) without running the game.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Level reached for a given score (1-based)
pub fn level_for_score(score: u32) -> u32 {
    1 + score / POINTS_PER_LEVEL
}

/// Base fall speed of new dots at `level` (pixels per frame)
pub fn fall_speed_for_level(level: u32) -> f32 {
    BASE_FALL_SPEED + level.saturating_sub(1) as f32 * SPEED_INCREASE_RATE
}

/// Frames between spawns at `level`, clamped at [`MIN_SPAWN_INTERVAL`]
pub fn spawn_interval_for_level(level: u32) -> u32 {
    BASE_SPAWN_INTERVAL
        .saturating_sub(level.saturating_sub(1).saturating_mul(SPAWN_DECREASE_RATE))
        .max(MIN_SPAWN_INTERVAL)
}

/// Points for clearing a dot moving at `speed` (fast dot bonus)
pub fn points_for_speed(speed: f32) -> u32 {
    if speed > 3.5 {
        20
    } else if speed > 2.5 {
        15
    } else {
        10
    }
}

/// Whether dots spawned at `level` get a random extra speed
pub fn speed_variation_applies(level: u32) -> bool {
    level > 3
}

/// Percent chance (0..100) that a freshly generated pattern is used.
/// Patterns only kick in from level 2.
pub fn pattern_probability(level: u32) -> u32 {
    if level < 2 {
        0
    } else {
        30u32.saturating_add(level.saturating_mul(5))
    }
}

/// Difficulty parameters derived from a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub level: u32,
    pub fall_speed: f32,
    pub spawn_interval: u32,
}

impl Difficulty {
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        Self {
            level,
            fall_speed: fall_speed_for_level(level),
            spawn_interval: spawn_interval_for_level(level),
        }
    }

    pub fn for_score(score: u32) -> Self {
        Self::for_level(level_for_score(score))
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::for_level(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(99), 1);
        assert_eq!(level_for_score(100), 2);
        assert_eq!(level_for_score(250), 3);
    }

    #[test]
    fn test_level_one_defaults() {
        let d = Difficulty::default();
        assert_eq!(d.level, 1);
        assert!((d.fall_speed - 2.0).abs() < 1e-6);
        assert_eq!(d.spawn_interval, 120);
    }

    #[test]
    fn test_spawn_interval_floor() {
        // 120 - 16 * 5 = 40 is the first level at the floor
        assert_eq!(spawn_interval_for_level(16), 40);
        assert_eq!(spawn_interval_for_level(15), 45);
        assert_eq!(spawn_interval_for_level(50), 40);
        assert_eq!(spawn_interval_for_level(u32::MAX), 40);
    }

    #[test]
    fn test_points_for_speed() {
        assert_eq!(points_for_speed(2.0), 10);
        assert_eq!(points_for_speed(2.5), 10);
        assert_eq!(points_for_speed(2.6), 15);
        assert_eq!(points_for_speed(3.5), 15);
        assert_eq!(points_for_speed(3.6), 20);
    }

    #[test]
    fn test_pattern_probability() {
        assert_eq!(pattern_probability(1), 0);
        assert_eq!(pattern_probability(2), 40);
        assert_eq!(pattern_probability(10), 80);
        assert!(pattern_probability(14) >= 100);
    }

    proptest! {
        #[test]
        fn level_is_monotonic_in_score(a in 0u32..1_000_000, b in 0u32..1_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for_score(lo) <= level_for_score(hi));
        }

        #[test]
        fn level_matches_hundreds(score in 0u32..1_000_000) {
            let level = level_for_score(score);
            prop_assert!((level - 1) * POINTS_PER_LEVEL <= score);
            prop_assert!(score < level * POINTS_PER_LEVEL);
        }

        #[test]
        fn spawn_interval_clamped_and_non_increasing(level in 1u32..10_000) {
            let here = spawn_interval_for_level(level);
            let next = spawn_interval_for_level(level + 1);
            prop_assert!(here >= MIN_SPAWN_INTERVAL);
            prop_assert!(here <= BASE_SPAWN_INTERVAL);
            prop_assert!(next <= here);
        }

        #[test]
        fn fall_speed_grows_with_level(level in 1u32..1_000) {
            prop_assert!(fall_speed_for_level(level + 1) > fall_speed_for_level(level));
            prop_assert!(fall_speed_for_level(level) >= BASE_FALL_SPEED);
        }
    }
}
