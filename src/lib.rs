//! RGB Guardian - a reaction-time arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (difficulty curve, color patterns, dots)
//! - `renderer`: Scene description and the WebGPU pipeline that draws it
//! - `audio`: Procedural sound recipes and playback backends
//! - `platform`: Terminal (native) and browser frontends
//! - `settings`: Player preferences
//! - `highscores`: Leaderboard of this session's runs

pub mod audio;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Playfield size in pixels
    pub const WINDOW_WIDTH: f32 = 500.0;
    pub const WINDOW_HEIGHT: f32 = 700.0;

    /// Central column the dots fall down
    pub const COLUMN_WIDTH: f32 = 80.0;
    pub const DOT_SIZE: f32 = 50.0;

    /// Button row
    pub const BUTTON_WIDTH: f32 = 120.0;
    pub const BUTTON_HEIGHT: f32 = 80.0;
    pub const BUTTON_Y: f32 = 600.0;
    pub const BUTTON_GAP: f32 = 20.0;
    pub const BUTTON_LEFT: f32 = 40.0;

    /// A dot whose top edge passes this line has reached the buttons
    pub const BOTTOM_LINE: f32 = BUTTON_Y - DOT_SIZE - 10.0;

    /// Frames per second of the simulation (one tick per frame)
    pub const FPS: u32 = 60;
    pub const SIM_DT: f32 = 1.0 / FPS as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Difficulty curve
    pub const POINTS_PER_LEVEL: u32 = 100;
    pub const BASE_FALL_SPEED: f32 = 2.0; // pixels per frame
    pub const SPEED_INCREASE_RATE: f32 = 0.1; // per level
    pub const BASE_SPAWN_INTERVAL: u32 = 120; // frames
    pub const SPAWN_DECREASE_RATE: u32 = 5; // per level
    pub const MIN_SPAWN_INTERVAL: u32 = 40;

    /// Timers (frames)
    pub const LEVEL_UP_BANNER_TICKS: u32 = 120;
    pub const BUTTON_FLASH_TICKS: u32 = 10;
}

/// Left edge of the falling column
#[inline]
pub fn column_left() -> f32 {
    consts::WINDOW_WIDTH / 2.0 - consts::COLUMN_WIDTH / 2.0
}

/// Left edge of the button for color slot `index` (0..3)
#[inline]
pub fn button_left(index: usize) -> f32 {
    consts::BUTTON_LEFT + index as f32 * (consts::BUTTON_WIDTH + consts::BUTTON_GAP)
}
