//! Game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::pattern::PatternGenerator;
use crate::consts::*;

/// Dot / button colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DotColor {
    Red,
    Green,
    Blue,
}

impl DotColor {
    /// All colors in button order (left to right)
    pub const ALL: [DotColor; 3] = [DotColor::Red, DotColor::Green, DotColor::Blue];

    /// Button slot (0..3)
    pub fn index(self) -> usize {
        match self {
            DotColor::Red => 0,
            DotColor::Green => 1,
            DotColor::Blue => 2,
        }
    }

    /// Key label shown on the button
    pub fn label(self) -> &'static str {
        match self {
            DotColor::Red => "R",
            DotColor::Green => "G",
            DotColor::Blue => "B",
        }
    }

    /// Uniformly random color
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A falling dot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    /// Top-left corner in playfield pixels (y grows downward)
    pub pos: Vec2,
    pub color: DotColor,
    /// Cleared dots are inactive until they are swept out
    pub active: bool,
    /// Pixels per frame
    pub speed: f32,
}

impl Dot {
    pub fn new(pos: Vec2, color: DotColor, speed: f32) -> Self {
        Self {
            pos,
            color,
            active: true,
            speed,
        }
    }

    /// Spawn position: centered in the column, just above the screen
    pub fn spawn_pos() -> Vec2 {
        Vec2::new(WINDOW_WIDTH / 2.0 - DOT_SIZE / 2.0, -DOT_SIZE)
    }

    pub fn advance(&mut self) {
        self.pos.y += self.speed;
    }

    pub fn reached_bottom(&self) -> bool {
        self.pos.y > BOTTOM_LINE
    }

    /// Dots only become targetable once they have entered the screen
    pub fn is_visible(&self) -> bool {
        self.pos.y > -1.0
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Dots falling
    Playing,
    /// Game is paused
    Paused,
    /// Run ended (wrong color or a missed dot)
    GameOver,
}

/// Things that happened during a tick, for audio/logging/leaderboards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Correct key: dot cleared
    Cleared { color: DotColor, points: u32 },
    /// Wrong key for the lowest dot
    WrongColor { pressed: DotColor, expected: DotColor },
    /// A dot reached the buttons
    Missed { color: DotColor },
    LevelUp {
        level: u32,
        fall_speed: f32,
        spawn_interval: u32,
    },
    GameOver { score: u32, level: u32 },
    Paused,
    Resumed,
    Restarted,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    rng: Pcg32,
    pub score: u32,
    /// Best score this session (survives restarts)
    pub high_score: u32,
    pub level: u32,
    /// Base speed of newly spawned dots (pixels per frame)
    pub fall_speed: f32,
    /// Frames between spawns
    pub spawn_interval: u32,
    /// Frames played in the current run (not advanced while paused)
    pub frame_count: u64,
    /// Remaining frames of the "LEVEL UP" banner
    pub level_up_ticks: u32,
    pub phase: GamePhase,
    /// Remaining flash frames per button, indexed by [`DotColor::index`]
    pub button_ticks: [u32; 3],
    pub dots: Vec<Dot>,
    pub pattern: PatternGenerator,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        let difficulty = Difficulty::default();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            high_score: 0,
            level: difficulty.level,
            fall_speed: difficulty.fall_speed,
            spawn_interval: difficulty.spawn_interval,
            frame_count: 0,
            level_up_ticks: 0,
            phase: GamePhase::Playing,
            button_ticks: [0; 3],
            dots: Vec::new(),
            pattern: PatternGenerator::new(),
        }
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty {
            level: self.level,
            fall_speed: self.fall_speed,
            spawn_interval: self.spawn_interval,
        }
    }

    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.level = difficulty.level;
        self.fall_speed = difficulty.fall_speed;
        self.spawn_interval = difficulty.spawn_interval;
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    /// Index of the dot a key press applies to: the lowest visible active dot
    pub fn target_dot(&self) -> Option<usize> {
        self.dots
            .iter()
            .enumerate()
            .filter(|(_, d)| d.active && d.is_visible())
            .max_by(|(_, a), (_, b)| {
                a.pos
                    .y
                    .partial_cmp(&b.pos.y)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    pub fn button_lit(&self, color: DotColor) -> bool {
        self.button_ticks[color.index()] > 0
    }

    pub fn show_level_up(&self) -> bool {
        self.level_up_ticks > 0
    }

    /// Start a fresh run. The high score and RNG stream carry over.
    pub fn restart(&mut self) {
        let difficulty = Difficulty::default();
        self.apply_difficulty(difficulty);
        self.score = 0;
        self.frame_count = 0;
        self.level_up_ticks = 0;
        self.phase = GamePhase::Playing;
        self.dots.clear();
        self.pattern.reset();
    }
}
