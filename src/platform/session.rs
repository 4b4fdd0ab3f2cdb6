//! Frontend-agnostic game session
//!
//! Owns the simulation state, the input gathered between ticks and the
//! per-session leaderboard. Both frontends drive the game through this.

use super::input::{Command, command_for_key};
use crate::highscores::HighScores;
use crate::renderer::SceneOptions;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

#[derive(Debug, Clone)]
pub struct Session {
    pub state: GameState,
    /// Input collected since the last tick
    pub input: TickInput,
    pub leaderboard: HighScores,
    /// 1-based index of the current run
    pub run: u32,
    /// Leaderboard rank of the run that just ended
    pub run_rank: Option<usize>,
    /// Highest level reached in any run
    pub best_level: u32,
    pub quit: bool,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self {
            state: GameState::new(seed),
            input: TickInput::default(),
            leaderboard: HighScores::new(),
            run: 1,
            run_rank: None,
            best_level: 1,
            quit: false,
        }
    }

    /// Queue the command bound to `key`, if any
    pub fn handle_key(&mut self, key: &str) -> Option<Command> {
        let command = command_for_key(key)?;
        match command {
            Command::Quit => self.quit = true,
            other => other.apply(&mut self.input),
        }
        Some(command)
    }

    /// Pause on focus loss; never resumes a game the player paused
    pub fn auto_pause(&mut self) -> bool {
        if self.state.phase == GamePhase::Playing && !self.input.pause {
            self.input.pause = true;
            true
        } else {
            false
        }
    }

    /// Run one tick with the pending input and do the session bookkeeping
    pub fn step(&mut self) -> Vec<GameEvent> {
        let events = tick(&mut self.state, &self.input);
        self.input.clear();

        for event in &events {
            match *event {
                GameEvent::LevelUp { level, .. } => {
                    self.best_level = self.best_level.max(level);
                }
                GameEvent::GameOver { score, level } => {
                    self.run_rank = self.leaderboard.add_score(score, level, self.run);
                }
                GameEvent::Restarted => {
                    self.run += 1;
                    self.run_rank = None;
                }
                _ => {}
            }
        }

        events
    }

    pub fn scene_options(&self, settings: &Settings, fps: Option<u32>) -> SceneOptions {
        SceneOptions {
            reduced_motion: settings.reduced_motion,
            fps: if settings.show_fps { fps } else { None },
            run_rank: self.run_rank,
        }
    }

    /// End-of-session report
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Final score: {}\nHigh score: {}\nLevel reached: {}\nGames played: {}\n",
            self.state.score, self.state.high_score, self.best_level, self.run
        );
        if let Some(best) = self.leaderboard.top_score() {
            out.push_str(&format!("\nSession leaderboard (best {}):\n", best));
            for (i, entry) in self.leaderboard.entries().iter().enumerate() {
                out.push_str(&format!(
                    "{:>3}. {:>6}  level {:<3} (run {})\n",
                    i + 1,
                    entry.score,
                    entry.level,
                    entry.run
                ));
            }
        }
        out
    }
}
