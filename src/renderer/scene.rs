//! Frame description
//!
//! Translates a [`GameState`] into an ordered list of draw primitives in
//! playfield pixels. Backends (wgpu canvas, terminal cells) only need to know
//! how to fill/stroke rectangles and place text.

use crate::consts::*;
use crate::sim::{DotColor, GameState};
use crate::{button_left, column_left};

/// 8-bit sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Darken/brighten the color channels (alpha untouched)
    pub fn scaled(self, factor: f32) -> Self {
        let s = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Self {
            r: s(self.r),
            g: s(self.g),
            b: s(self.b),
            a: self.a,
        }
    }

    /// Source-over blend onto an opaque destination
    pub fn over(self, dst: Rgba) -> Rgba {
        let a = self.a as f32 / 255.0;
        let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a) + 0.5) as u8;
        Rgba::rgb(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b))
    }

    /// Linear-light floats for an sRGB render target
    pub fn to_linear(self) -> [f32; 4] {
        let lin = |c: u8| {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [lin(self.r), lin(self.g), lin(self.b), self.a as f32 / 255.0]
    }
}

/// Screen-space rectangle (pixels, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Shrink by `by` pixels on every side
    pub fn inset(self, by: f32) -> Self {
        Self::new(self.x + by, self.y + by, self.w - 2.0 * by, self.h - 2.0 * by)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

/// Font sizes (20 px regular, 32 px bold title, 16 px small)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Title,
    Normal,
    Small,
}

impl TextSize {
    pub fn px(self) -> f32 {
        match self {
            TextSize::Title => 32.0,
            TextSize::Normal => 20.0,
            TextSize::Small => 16.0,
        }
    }
}

/// Where a text's (x, y) sits relative to the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Rgba),
    FillRect(Rect, Rgba),
    /// 1 px outline
    StrokeRect(Rect, Rgba),
    Text {
        text: String,
        x: f32,
        y: f32,
        size: TextSize,
        anchor: Anchor,
        color: Rgba,
    },
}

/// One rendered frame, back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCmd>,
}

impl Frame {
    fn fill(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCmd::FillRect(rect, color));
    }

    fn stroke(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCmd::StrokeRect(rect, color));
    }

    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: TextSize, color: Rgba) {
        self.commands.push(DrawCmd::Text {
            text: text.into(),
            x,
            y,
            size,
            anchor: Anchor::TopLeft,
            color,
        });
    }

    fn centered_text(&mut self, text: impl Into<String>, x: f32, y: f32, size: TextSize, color: Rgba) {
        self.commands.push(DrawCmd::Text {
            text: text.into(),
            x,
            y,
            size,
            anchor: Anchor::Center,
            color,
        });
    }

    /// All text strings in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }
}

/// Presentation knobs that don't live in the simulation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneOptions {
    /// Disable the fast-dot pulse
    pub reduced_motion: bool,
    /// FPS counter value, when shown
    pub fps: Option<u32>,
    /// Leaderboard rank of the run that just ended
    pub run_rank: Option<usize>,
}

/// Base color of a dot/button
pub fn dot_color(color: DotColor) -> Rgba {
    match color {
        DotColor::Red => Rgba::rgb(255, 50, 50),
        DotColor::Green => Rgba::rgb(50, 255, 50),
        DotColor::Blue => Rgba::rgb(50, 100, 255),
    }
}

/// Background darkens as the level rises
pub fn background_color(level: u32) -> Rgba {
    let d = 25u32.saturating_sub(level.saturating_mul(2)).max(10) as u8;
    Rgba::rgb(d, d, d + 10)
}

/// Column fill lightens as the level rises
pub fn column_color(level: u32) -> Rgba {
    let i = 80u32.saturating_add(level.saturating_mul(5)).min(120) as u8;
    Rgba::rgb(i, i, i + 10)
}

pub fn column_border_color(level: u32) -> Rgba {
    let c = |base: u32| base.saturating_add(level.saturating_mul(5)).min(255) as u8;
    Rgba::rgb(c(150), c(150), c(160))
}

/// Level readout: cyan, orange past 5, red past 10
pub fn level_color(level: u32) -> Rgba {
    if level > 10 {
        Rgba::rgb(255, 50, 50)
    } else if level > 5 {
        Rgba::rgb(255, 150, 50)
    } else {
        Rgba::rgb(100, 255, 255)
    }
}

/// Banner opacity: solid, then fades over its last second
pub fn banner_alpha(ticks: u32) -> u8 {
    if ticks > 60 { 255 } else { (ticks * 4).min(255) as u8 }
}

/// Dots faster than 3.0 px/frame pulse
pub fn dot_alpha(speed: f32, frame: u64, reduced_motion: bool) -> u8 {
    if speed > 3.0 && !reduced_motion {
        (200.0 + 55.0 * (frame as f32 * 0.1).sin()) as u8
    } else {
        255
    }
}

/// Describe the current frame
pub fn build_frame(state: &GameState, options: &SceneOptions) -> Frame {
    let mut frame = Frame::default();
    let level = state.level;

    frame.commands.push(DrawCmd::Clear(background_color(level)));

    // Column
    let column = Rect::new(column_left(), 0.0, COLUMN_WIDTH, BUTTON_Y);
    frame.fill(column, column_color(level));
    frame.stroke(column, column_border_color(level));

    // Dots
    for dot in state.dots.iter().filter(|d| d.active) {
        let rect = Rect::new(dot.pos.x.trunc(), dot.pos.y.trunc(), DOT_SIZE, DOT_SIZE);
        let alpha = dot_alpha(dot.speed, state.frame_count, options.reduced_motion);
        frame.fill(rect, dot_color(dot.color).with_alpha(alpha));
        frame.stroke(rect, Rgba::WHITE);
        if dot.speed > 3.5 {
            frame.stroke(rect.inset(2.0), Rgba::WHITE);
        }
    }

    // Buttons
    for color in DotColor::ALL {
        let rect = Rect::new(button_left(color.index()), BUTTON_Y, BUTTON_WIDTH, BUTTON_HEIGHT);
        let base = dot_color(color);
        let fill = if state.button_lit(color) { base } else { base.scaled(0.7) };
        frame.fill(rect, fill);
        frame.stroke(rect, Rgba::WHITE);
        frame.centered_text(
            color.label(),
            rect.x + rect.w / 2.0,
            rect.y + rect.h / 2.0,
            TextSize::Title,
            Rgba::WHITE,
        );
    }

    // HUD
    frame.text("RGB GUARDIAN", 10.0, 10.0, TextSize::Title, Rgba::rgb(255, 255, 100));
    frame.text(format!("Score: {}", state.score), 10.0, 50.0, TextSize::Normal, Rgba::WHITE);
    frame.text(format!("Best: {}", state.high_score), 10.0, 75.0, TextSize::Normal, Rgba::WHITE);
    frame.text(format!("Level: {}", level), 10.0, 100.0, TextSize::Normal, level_color(level));
    frame.text(
        format!("Speed: x{:.1}", state.fall_speed),
        10.0,
        125.0,
        TextSize::Small,
        Rgba::rgb(200, 200, 200),
    );
    if let Some(fps) = options.fps {
        frame.text(
            format!("FPS: {}", fps),
            10.0,
            145.0,
            TextSize::Small,
            Rgba::rgb(150, 150, 150),
        );
    }

    if state.is_paused() {
        draw_pause_overlay(&mut frame);
        return frame;
    }

    if state.show_level_up() {
        let alpha = banner_alpha(state.level_up_ticks);
        let banner = Rect::new(50.0, WINDOW_HEIGHT / 2.0 - 40.0, WINDOW_WIDTH - 100.0, 80.0);
        frame.fill(banner, Rgba::rgba(255, 215, 0, (alpha as f32 * 0.8) as u8));
        frame.stroke(banner, Rgba::WHITE.with_alpha(alpha));
        frame.text(
            format!("LEVEL {}!", level),
            WINDOW_WIDTH / 2.0 - 60.0,
            WINDOW_HEIGHT / 2.0 - 20.0,
            TextSize::Title,
            Rgba::WHITE.with_alpha(alpha),
        );
        frame.text(
            "Difficulty Increased!",
            WINDOW_WIDTH / 2.0 - 80.0,
            WINDOW_HEIGHT / 2.0 + 15.0,
            TextSize::Small,
            Rgba::WHITE.with_alpha(alpha),
        );
    }

    let game_over = state.is_game_over();
    if state.frame_count < 300 && !game_over && level == 1 {
        frame.text(
            "Press R, G, or B keys!",
            WINDOW_WIDTH / 2.0 - 100.0,
            BUTTON_Y - 40.0,
            TextSize::Normal,
            Rgba::rgb(200, 200, 255),
        );
    }
    if state.frame_count > 60 && state.frame_count < 240 && !game_over {
        frame.text(
            "Press P to pause",
            WINDOW_WIDTH - 140.0,
            10.0,
            TextSize::Small,
            Rgba::rgba(150, 150, 200, 200),
        );
    }
    if state.pattern.is_active() && level >= 3 {
        frame.text(
            "Pattern Mode!",
            WINDOW_WIDTH / 2.0 - 50.0,
            BUTTON_Y - 40.0,
            TextSize::Small,
            Rgba::rgb(255, 200, 100),
        );
    }

    if game_over {
        draw_game_over(&mut frame, state, options.run_rank);
    }

    frame
}

fn draw_pause_overlay(frame: &mut Frame) {
    let (cx, cy) = (WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0);
    frame.fill(Rect::new(0.0, 0.0, WINDOW_WIDTH, WINDOW_HEIGHT), Rgba::BLACK.with_alpha(180));
    frame.fill(Rect::new(cx - 120.0, cy - 80.0, 240.0, 160.0), Rgba::WHITE);
    frame.stroke(Rect::new(cx - 125.0, cy - 85.0, 250.0, 170.0), Rgba::rgb(100, 100, 255));
    frame.text("PAUSED", cx - 60.0, cy - 50.0, TextSize::Title, Rgba::BLACK);
    frame.text("Press P to resume", cx - 75.0, cy + 10.0, TextSize::Normal, Rgba::rgb(50, 50, 50));
    frame.text("ESC to quit", cx - 50.0, cy + 40.0, TextSize::Small, Rgba::rgb(100, 100, 100));
}

fn draw_game_over(frame: &mut Frame, state: &GameState, rank: Option<usize>) {
    let (cx, cy) = (WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0);
    frame.fill(Rect::new(0.0, 0.0, WINDOW_WIDTH, WINDOW_HEIGHT), Rgba::BLACK.with_alpha(200));
    frame.text("GAME OVER", cx - 80.0, cy - 80.0, TextSize::Title, Rgba::rgb(255, 100, 100));
    frame.text(
        format!("Final Score: {}", state.score),
        cx - 70.0,
        cy - 30.0,
        TextSize::Normal,
        Rgba::WHITE,
    );
    frame.text(
        format!("Level Reached: {}", state.level),
        cx - 75.0,
        cy,
        TextSize::Normal,
        Rgba::rgb(255, 255, 100),
    );
    frame.text(
        format!("Best Score: {}", state.high_score),
        cx - 65.0,
        cy + 30.0,
        TextSize::Small,
        Rgba::rgb(200, 200, 200),
    );
    frame.text(
        "Press SPACE to restart",
        cx - 100.0,
        cy + 60.0,
        TextSize::Normal,
        Rgba::rgb(200, 200, 255),
    );
    if let Some(rank) = rank {
        let label = if rank == 1 {
            "New session best!".to_string()
        } else {
            format!("#{} this session", rank)
        };
        frame.text(label, cx - 70.0, cy + 95.0, TextSize::Small, Rgba::rgb(255, 215, 0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Dot, GamePhase};
    use glam::Vec2;

    fn fills(frame: &Frame) -> Vec<(Rect, Rgba)> {
        frame
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::FillRect(r, col) => Some((*r, *col)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_background_and_column_scale_with_level() {
        assert_eq!(background_color(1), Rgba::rgb(23, 23, 33));
        assert_eq!(background_color(8), Rgba::rgb(10, 10, 20));
        assert_eq!(column_color(1), Rgba::rgb(85, 85, 95));
        assert_eq!(column_color(20), Rgba::rgb(120, 120, 130));
        assert_eq!(column_border_color(30), Rgba::rgb(255, 255, 255));
    }

    #[test]
    fn test_banner_alpha_fades_out() {
        assert_eq!(banner_alpha(120), 255);
        assert_eq!(banner_alpha(61), 255);
        assert_eq!(banner_alpha(60), 240);
        assert_eq!(banner_alpha(1), 4);
    }

    #[test]
    fn test_fast_dots_pulse_unless_reduced_motion() {
        assert_eq!(dot_alpha(2.5, 10, false), 255);
        assert!(dot_alpha(3.2, 40, false) < 255);
        assert_eq!(dot_alpha(3.2, 40, true), 255);
    }

    #[test]
    fn test_level_colors() {
        assert_eq!(level_color(1), Rgba::rgb(100, 255, 255));
        assert_eq!(level_color(6), Rgba::rgb(255, 150, 50));
        assert_eq!(level_color(11), Rgba::rgb(255, 50, 50));
    }

    #[test]
    fn test_hud_and_first_frames_hint() {
        let mut state = GameState::new(1);
        state.score = 40;
        state.high_score = 90;
        state.frame_count = 100;
        let frame = build_frame(&state, &SceneOptions::default());

        assert!(frame.has_text("Score: 40"));
        assert!(frame.has_text("Best: 90"));
        assert!(frame.has_text("Level: 1"));
        assert!(frame.has_text("Speed: x2.0"));
        assert!(frame.has_text("Press R, G, or B keys!"));
        assert!(frame.has_text("Press P to pause"));
        assert!(!frame.has_text("GAME OVER"));
    }

    #[test]
    fn test_only_active_dots_are_drawn() {
        let mut state = GameState::new(1);
        state.dots.push(Dot::new(Vec2::new(225.0, 100.0), DotColor::Red, 2.0));
        let mut cleared = Dot::new(Vec2::new(225.0, 300.0), DotColor::Blue, 2.0);
        cleared.active = false;
        state.dots.push(cleared);

        let frame = build_frame(&state, &SceneOptions::default());
        let dot_fills: Vec<_> = fills(&frame)
            .into_iter()
            .filter(|(r, _)| r.w == DOT_SIZE && r.h == DOT_SIZE)
            .collect();
        assert_eq!(dot_fills.len(), 1);
        assert_eq!(dot_fills[0].0, Rect::new(225.0, 100.0, DOT_SIZE, DOT_SIZE));
        assert_eq!(dot_fills[0].1, dot_color(DotColor::Red));
    }

    #[test]
    fn test_lit_button_is_full_color() {
        let mut state = GameState::new(1);
        state.button_ticks[DotColor::Green.index()] = 5;
        let frame = build_frame(&state, &SceneOptions::default());
        let buttons: Vec<_> = fills(&frame)
            .into_iter()
            .filter(|(r, _)| r.y == BUTTON_Y)
            .collect();
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[0].1, dot_color(DotColor::Red).scaled(0.7));
        assert_eq!(buttons[1].1, dot_color(DotColor::Green));
    }

    #[test]
    fn test_pause_overlay_hides_banner_and_hints() {
        let mut state = GameState::new(1);
        state.frame_count = 100;
        state.level_up_ticks = 50;
        state.phase = GamePhase::Paused;
        let frame = build_frame(&state, &SceneOptions::default());

        assert!(frame.has_text("PAUSED"));
        assert!(frame.has_text("Press P to resume"));
        assert!(!frame.has_text("Press R, G, or B keys!"));
        assert!(!frame.texts().any(|t| t.starts_with("LEVEL ")));
    }

    #[test]
    fn test_level_up_banner() {
        let mut state = GameState::new(1);
        state.level = 4;
        state.level_up_ticks = 90;
        let frame = build_frame(&state, &SceneOptions::default());
        assert!(frame.has_text("LEVEL 4!"));
        assert!(frame.has_text("Difficulty Increased!"));
    }

    #[test]
    fn test_game_over_screen_shows_rank() {
        let mut state = GameState::new(1);
        state.score = 120;
        state.high_score = 200;
        state.level = 2;
        state.phase = GamePhase::GameOver;
        let options = SceneOptions {
            run_rank: Some(2),
            ..Default::default()
        };
        let frame = build_frame(&state, &options);

        assert!(frame.has_text("GAME OVER"));
        assert!(frame.has_text("Final Score: 120"));
        assert!(frame.has_text("Level Reached: 2"));
        assert!(frame.has_text("Best Score: 200"));
        assert!(frame.has_text("Press SPACE to restart"));
        assert!(frame.has_text("#2 this session"));
    }

    #[test]
    fn test_blend_and_linear() {
        let half = Rgba::rgba(255, 255, 255, 128);
        let out = half.over(Rgba::BLACK);
        assert!(out.r > 120 && out.r < 135);
        assert_eq!(Rgba::WHITE.to_linear(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(Rgba::BLACK.to_linear()[0], 0.0);
    }
}
