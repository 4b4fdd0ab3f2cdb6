//! Color sequencing for spawned dots
//!
//! Colors are either uniformly random or drawn from a short repeating
//! pattern. Pattern shape depends on the level band:
//! - levels 1-2: random colors (still a fixed sequence once rolled)
//! - levels 3-5: two colors alternating
//! - levels 6+: the full R-G-B cycle, sometimes reversed

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::pattern_probability;
use super::state::DotColor;

/// Chance (percent) to roll a fresh pattern each time the current one wraps
pub const REGENERATE_ON_WRAP_PERCENT: u32 = 40;

/// Pattern length for a level
pub fn pattern_length(level: u32) -> usize {
    3 + (level / 3) as usize
}

/// Pattern state: sequence, cursor, and whether it drives spawning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternGenerator {
    sequence: Vec<DotColor>,
    cursor: usize,
    enabled: bool,
}

impl PatternGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when colors come from the pattern rather than the RNG
    pub fn is_active(&self) -> bool {
        self.enabled && !self.sequence.is_empty()
    }

    pub fn sequence(&self) -> &[DotColor] {
        &self.sequence
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Back to pure random colors
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.cursor = 0;
        self.enabled = false;
    }

    /// Build a new pattern for `level` and roll whether to use it
    pub fn regenerate<R: Rng + ?Sized>(&mut self, level: u32, rng: &mut R) {
        self.sequence.clear();
        self.cursor = 0;

        let len = pattern_length(level);

        if level < 3 {
            self.sequence
                .extend((0..len).map(|_| DotColor::random(rng)));
        } else if level < 6 {
            let first = DotColor::random(rng);
            let second = DotColor::random(rng);
            self.sequence
                .extend((0..len).map(|i| if i % 2 == 0 { first } else { second }));
        } else {
            self.sequence
                .extend((0..len).map(|i| DotColor::ALL[i % DotColor::ALL.len()]));
            if rng.random_bool(0.5) {
                self.sequence.reverse();
            }
        }

        // Level 1 never uses patterns; the roll is skipped there
        self.enabled = level >= 2 && rng.random_range(0..100) < pattern_probability(level);

        log::debug!(
            "Pattern regenerated for level {}: {:?} (active: {})",
            level,
            self.sequence,
            self.enabled
        );
    }

    /// Color for the next spawned dot
    pub fn next_color<R: Rng + ?Sized>(&mut self, level: u32, rng: &mut R) -> DotColor {
        if !self.is_active() {
            return DotColor::random(rng);
        }

        let color = self.sequence[self.cursor];
        self.cursor += 1;
        if self.cursor >= self.sequence.len() {
            self.cursor = 0;
            if rng.random_range(0..100) < REGENERATE_ON_WRAP_PERCENT {
                self.regenerate(level, rng);
            }
        }
        color
    }
}
