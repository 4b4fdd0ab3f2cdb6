//! Per-frame simulation tick
//!
//! One call advances the game by exactly one frame. Inputs collected during
//! the frame are applied first, then dots spawn and fall.

use super::difficulty::{Difficulty, level_for_score, points_for_speed, speed_variation_applies};
use super::state::{Dot, DotColor, GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Color keys pressed this frame, in the order they arrived
    pub presses: Vec<DotColor>,
    /// Pause toggle
    pub pause: bool,
    /// Start a new run (only honored after game over)
    pub restart: bool,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        self.presses.is_empty() && !self.pause && !self.restart
    }

    /// Clear one-shot inputs after processing
    pub fn clear(&mut self) {
        self.presses.clear();
        self.pause = false;
        self.restart = false;
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    for &color in &input.presses {
        handle_press(state, color, &mut events);
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Game paused");
                events.push(GameEvent::Paused);
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Game resumed");
                events.push(GameEvent::Resumed);
            }
            GamePhase::GameOver => {}
        }
    }

    if input.restart && state.is_game_over() {
        state.restart();
        log::info!("New game (best so far: {})", state.high_score);
        events.push(GameEvent::Restarted);
    }

    // Button flashes fade even while paused
    for ticks in &mut state.button_ticks {
        *ticks = ticks.saturating_sub(1);
    }

    // The level-up banner keeps fading under the game-over screen
    if state.phase != GamePhase::Paused {
        state.level_up_ticks = state.level_up_ticks.saturating_sub(1);
    }

    if state.phase != GamePhase::Playing {
        return events;
    }

    state.frame_count += 1;

    if state.frame_count % u64::from(state.spawn_interval.max(1)) == 0 {
        spawn_dot(state);
    }

    let mut missed = None;
    for dot in state.dots.iter_mut().filter(|d| d.active) {
        dot.advance();
        if dot.reached_bottom() && missed.is_none() {
            missed = Some(dot.color);
        }
    }

    // Cleared dots are never drawn again
    state.dots.retain(|d| d.active);

    if let Some(color) = missed {
        log::info!("Missed a {:?} dot! Final level: {}", color, state.level);
        events.push(GameEvent::Missed { color });
        end_game(state, &mut events);
    }

    events
}

fn handle_press(state: &mut GameState, color: DotColor, events: &mut Vec<GameEvent>) {
    if state.phase != GamePhase::Playing {
        return;
    }

    state.button_ticks[color.index()] = BUTTON_FLASH_TICKS;

    let Some(idx) = state.target_dot() else {
        return;
    };
    let dot = &mut state.dots[idx];

    if dot.color != color {
        let expected = dot.color;
        log::info!(
            "Wrong color ({:?} for {:?})! Final level: {}",
            color,
            expected,
            state.level
        );
        events.push(GameEvent::WrongColor {
            pressed: color,
            expected,
        });
        end_game(state, events);
        return;
    }

    dot.active = false;
    let points = points_for_speed(dot.speed);

    state.score += points;
    state.high_score = state.high_score.max(state.score);

    if points > 10 {
        log::debug!("Fast dot bonus! +{} points", points);
    }
    events.push(GameEvent::Cleared { color, points });

    update_difficulty(state, events);
}

/// Re-derive the level from the score; on a level up retune speed/spawns
fn update_difficulty(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let new_level = level_for_score(state.score);
    if new_level <= state.level {
        return;
    }

    let difficulty = Difficulty::for_level(new_level);
    state.apply_difficulty(difficulty);
    state.level_up_ticks = LEVEL_UP_BANNER_TICKS;

    let level = state.level;
    let mut pattern = std::mem::take(&mut state.pattern);
    pattern.regenerate(level, state.rng());
    state.pattern = pattern;

    log::info!(
        "LEVEL UP! Now level {} (speed {:.1}, spawn every {} frames)",
        difficulty.level,
        difficulty.fall_speed,
        difficulty.spawn_interval
    );
    events.push(GameEvent::LevelUp {
        level: difficulty.level,
        fall_speed: difficulty.fall_speed,
        spawn_interval: difficulty.spawn_interval,
    });
}

fn spawn_dot(state: &mut GameState) {
    let level = state.level;
    let mut pattern = std::mem::take(&mut state.pattern);
    let color = pattern.next_color(level, state.rng());
    state.pattern = pattern;

    let variation = if speed_variation_applies(level) {
        use rand::Rng;
        state.rng().random_range(0..10) as f32 * 0.1
    } else {
        0.0
    };
    let speed = state.fall_speed + variation;

    log::debug!("Spawned {:?} dot at speed {:.1}", color, speed);
    state.dots.push(Dot::new(Dot::spawn_pos(), color, speed));
}

fn end_game(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.phase = GamePhase::GameOver;
    events.push(GameEvent::GameOver {
        score: state.score,
        level: state.level,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn press(color: DotColor) -> TickInput {
        TickInput {
            presses: vec![color],
            ..Default::default()
        }
    }

    fn visible_dot(color: DotColor, y: f32, speed: f32) -> Dot {
        Dot::new(Vec2::new(225.0, y), color, speed)
    }

    #[test]
    fn test_first_dot_spawns_on_interval() {
        let mut state = GameState::new(12345);
        let idle = TickInput::default();
        for _ in 0..119 {
            tick(&mut state, &idle);
        }
        assert!(state.dots.is_empty());

        tick(&mut state, &idle);
        assert_eq!(state.dots.len(), 1);
        let dot = &state.dots[0];
        // Spawned at -50 then moved once
        assert!((dot.pos.y - (-DOT_SIZE + 2.0)).abs() < 1e-4);
        assert!((dot.speed - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_correct_press_scores() {
        let mut state = GameState::new(1);
        state.dots.push(visible_dot(DotColor::Green, 200.0, 2.0));

        let events = tick(&mut state, &press(DotColor::Green));

        assert_eq!(state.score, 10);
        assert_eq!(state.high_score, 10);
        assert!(state.dots.is_empty());
        assert!(events.contains(&GameEvent::Cleared {
            color: DotColor::Green,
            points: 10
        }));
        assert!(state.button_lit(DotColor::Green));
    }

    #[test]
    fn test_fast_dot_bonus() {
        let mut state = GameState::new(1);
        state.dots.push(visible_dot(DotColor::Red, 200.0, 3.6));
        tick(&mut state, &press(DotColor::Red));
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_press_targets_lowest_dot() {
        let mut state = GameState::new(1);
        state.dots.push(visible_dot(DotColor::Red, 100.0, 2.0));
        state.dots.push(visible_dot(DotColor::Blue, 400.0, 2.0));

        tick(&mut state, &press(DotColor::Blue));

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.dots.len(), 1);
        assert_eq!(state.dots[0].color, DotColor::Red);
    }

    #[test]
    fn test_wrong_press_ends_game() {
        let mut state = GameState::new(1);
        state.dots.push(visible_dot(DotColor::Red, 200.0, 2.0));

        let events = tick(&mut state, &press(DotColor::Blue));

        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::WrongColor {
            pressed: DotColor::Blue,
            expected: DotColor::Red
        }));
        assert!(events.contains(&GameEvent::GameOver { score: 0, level: 1 }));
    }

    #[test]
    fn test_press_without_target_is_harmless() {
        let mut state = GameState::new(1);
        let events = tick(&mut state, &press(DotColor::Red));
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(events.is_empty());
        assert!(state.button_lit(DotColor::Red));
    }

    #[test]
    fn test_missed_dot_ends_game() {
        let mut state = GameState::new(1);
        state.dots.push(visible_dot(DotColor::Green, BOTTOM_LINE - 1.0, 2.0));

        let events = tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::Missed {
            color: DotColor::Green
        }));
    }

    #[test]
    fn test_level_up_retunes_difficulty() {
        let mut state = GameState::new(9);
        state.score = 95;
        state.high_score = 95;
        state.dots.push(visible_dot(DotColor::Red, 200.0, 2.0));

        let events = tick(&mut state, &press(DotColor::Red));

        assert_eq!(state.score, 105);
        assert_eq!(state.level, 2);
        assert!((state.fall_speed - 2.1).abs() < 1e-6);
        assert_eq!(state.spawn_interval, 115);
        assert_eq!(state.level_up_ticks, LEVEL_UP_BANNER_TICKS - 1);
        assert!(state.show_level_up());
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelUp { level: 2, .. })));
        assert_eq!(state.pattern.sequence().len(), 3);
    }

    #[test]
    fn test_level_tracks_score() {
        let mut state = GameState::new(77);
        for _ in 0..40 {
            let y = 300.0;
            state.dots.push(visible_dot(DotColor::Blue, y, 2.0));
            tick(&mut state, &press(DotColor::Blue));
            assert_eq!(state.level, level_for_score(state.score));
        }
        assert_eq!(state.score, 400);
        assert_eq!(state.level, 5);
    }

    #[test]
    fn test_pause_freezes_dots_and_ignores_presses() {
        let mut state = GameState::new(1);
        state.dots.push(visible_dot(DotColor::Red, 200.0, 2.0));

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        let events = tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(events, vec![GameEvent::Paused]);

        let frame = state.frame_count;
        tick(&mut state, &press(DotColor::Red));
        assert_eq!(state.score, 0);
        assert_eq!(state.frame_count, frame);
        assert!((state.dots[0].pos.y - 200.0).abs() < 1e-6);

        let events = tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(events, vec![GameEvent::Resumed]);
    }

    #[test]
    fn test_pause_ignored_after_game_over() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::GameOver;
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        assert!(tick(&mut state, &pause).is_empty());
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_restart_only_after_game_over() {
        let mut state = GameState::new(1);
        state.score = 50;
        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart);
        assert_eq!(state.score, 50);

        state.high_score = 50;
        state.phase = GamePhase::GameOver;
        let events = tick(&mut state, &restart);
        assert!(events.contains(&GameEvent::Restarted));
        assert_eq!(state.score, 0);
        assert_eq!(state.high_score, 50);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_button_flash_fades() {
        let mut state = GameState::new(1);
        tick(&mut state, &press(DotColor::Blue));
        let idle = TickInput::default();
        for _ in 0..BUTTON_FLASH_TICKS - 1 {
            assert!(state.button_lit(DotColor::Blue));
            tick(&mut state, &idle);
        }
        assert!(!state.button_lit(DotColor::Blue));
    }

    #[test]
    fn test_determinism() {
        // Two states with the same seed produce identical dot streams
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        state1.apply_difficulty(Difficulty::for_level(7));
        state2.apply_difficulty(Difficulty::for_level(7));

        let idle = TickInput::default();
        for _ in 0..200 {
            tick(&mut state1, &idle);
            tick(&mut state2, &idle);
            // Keep dots from landing so the run continues
            for state in [&mut state1, &mut state2] {
                state.dots.retain(|d| d.pos.y < 300.0);
            }
        }

        assert_eq!(state1.frame_count, state2.frame_count);
        assert_eq!(state1.dots, state2.dots);
        assert!(!state1.dots.is_empty());
    }

    #[test]
    fn test_banner_fades_after_game_over_but_not_while_paused() {
        let mut state = GameState::new(4);
        let idle = TickInput::default();

        state.level_up_ticks = 30;
        state.phase = GamePhase::GameOver;
        tick(&mut state, &idle);
        assert_eq!(state.level_up_ticks, 29);
        for _ in 0..40 {
            tick(&mut state, &idle);
        }
        assert!(!state.show_level_up());

        state.level_up_ticks = 30;
        state.phase = GamePhase::Paused;
        tick(&mut state, &idle);
        assert_eq!(state.level_up_ticks, 30);
    }

    /// Tick until the next spawn and return the new dot
    fn spawn_next(state: &mut GameState) -> Dot {
        let interval = u64::from(state.spawn_interval);
        state.dots.clear();
        state.frame_count = (state.frame_count / interval + 1) * interval - 1;
        tick(state, &TickInput::default());
        assert_eq!(state.dots.len(), 1);
        state.dots[0].clone()
    }

    #[test]
    fn test_no_speed_variation_up_to_level_three() {
        let mut state = GameState::new(21);
        state.score = 250;
        state.apply_difficulty(Difficulty::for_level(3));
        for _ in 0..30 {
            let dot = spawn_next(&mut state);
            assert_eq!(dot.speed, state.fall_speed);
        }
    }

    #[test]
    fn test_speed_variation_above_level_three() {
        let mut state = GameState::new(22);
        state.score = 400;
        state.apply_difficulty(Difficulty::for_level(5));
        let mut saw_faster = false;
        for _ in 0..40 {
            let dot = spawn_next(&mut state);
            let extra = dot.speed - state.fall_speed;
            assert!((-1e-4..=0.9 + 1e-4).contains(&extra), "extra speed {}", extra);
            let tenths = extra * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-3, "extra speed {}", extra);
            saw_faster |= extra > 0.05;
        }
        assert!(saw_faster);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_spawn_takes_color_from_active_pattern() {
        let mut state = GameState::new(23);
        let mut pattern = std::mem::take(&mut state.pattern);
        pattern.regenerate(14, state.rng());
        state.pattern = pattern;
        assert!(state.pattern.is_active());
        let expected = state.pattern.sequence().to_vec();

        let idle = TickInput::default();
        for _ in 0..BASE_SPAWN_INTERVAL {
            tick(&mut state, &idle);
        }
        assert_eq!(state.dots.len(), 1);
        assert_eq!(state.dots[0].color, expected[0]);
        assert_eq!(state.pattern.cursor(), 1);

        let second = spawn_next(&mut state);
        assert_eq!(second.color, expected[1]);
    }
}
