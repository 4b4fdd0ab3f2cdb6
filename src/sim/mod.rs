//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod difficulty;
pub mod pattern;
pub mod state;
pub mod tick;

pub use difficulty::{
    Difficulty, fall_speed_for_level, level_for_score, points_for_speed, spawn_interval_for_level,
};
pub use pattern::PatternGenerator;
pub use state::{Dot, DotColor, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
