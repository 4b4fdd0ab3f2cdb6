//! Terminal frontend
//!
//! Rasterizes each [`Frame`] onto a half-block pixel canvas (two pixels per
//! cell, stacked) scaled to fit the terminal, then flushes only the cells
//! that changed. Sound goes through rodio.

use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};

use super::session::Session;
use crate::audio::{AudioManager, AudioOutput};
use crate::consts::{WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::renderer::{Anchor, DrawCmd, Frame, Rect, Rgba, build_frame};
use crate::settings::Settings;

/// Below this many cells across, the playfield is unreadable
const MIN_PLAYFIELD_COLS: f32 = 20.0;

#[derive(Parser, Debug)]
#[command(name = "rgb-guardian")]
#[command(about = "Press R, G or B to match the falling dot before it lands", long_about = None)]
pub struct Args {
    /// JSON settings file
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// RNG seed (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Frame rate; the game advances one step per frame
    #[arg(long)]
    pub fps: Option<u32>,

    /// Directory containing the assets/ folder
    #[arg(long, default_value = ".")]
    pub assets: PathBuf,
}

impl Args {
    /// Settings file (or defaults) with command line overrides applied
    pub fn resolve_settings(&self) -> Settings {
        let mut settings = match &self.settings {
            Some(path) => Settings::load_from(path),
            None => Settings::default(),
        };
        if let Some(fps) = self.fps {
            settings.fps = fps;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        settings.sanitized()
    }
}

/// Playfield pixels to canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    scale: f32,
    off_x: f32,
    off_y: f32,
}

impl Viewport {
    fn fit(px_w: usize, px_h: usize) -> Self {
        let (w, h) = (px_w as f32, px_h as f32);
        let scale = (w / WINDOW_WIDTH).min(h / WINDOW_HEIGHT);
        Self {
            scale,
            off_x: ((w - WINDOW_WIDTH * scale) / 2.0).floor(),
            off_y: ((h - WINDOW_HEIGHT * scale) / 2.0).floor(),
        }
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.off_x + x * self.scale, self.off_y + y * self.scale)
    }

    fn too_small(&self) -> bool {
        WINDOW_WIDTH * self.scale < MIN_PLAYFIELD_COLS
    }
}

/// Pixel grid two rows per terminal cell, plus a cell-resolution text layer
struct Canvas {
    cols: usize,
    rows: usize,
    px: Vec<Rgba>,
    text: Vec<Option<(char, Rgba)>>,
    view: Viewport,
}

impl Canvas {
    fn new(cols: u16, rows: u16) -> Self {
        let (cols, rows) = (cols as usize, rows as usize);
        Self {
            cols,
            rows,
            px: vec![Rgba::BLACK; cols * rows * 2],
            text: vec![None; cols * rows],
            view: Viewport::fit(cols, rows * 2),
        }
    }

    fn px_height(&self) -> usize {
        self.rows * 2
    }

    /// Pixel span covered by `[a, b)`; never empty for a non-empty span
    fn span(a: f32, b: f32, limit: usize) -> std::ops::Range<usize> {
        let start = (a - 0.5).ceil().max(0.0) as usize;
        let mut end = (b - 0.5).ceil().max(0.0) as usize;
        if b > a && end <= start {
            end = start + 1;
        }
        start.min(limit)..end.min(limit)
    }

    fn pixel_bounds(&self, rect: Rect) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let (x0, y0) = self.view.map(rect.x, rect.y);
        let (x1, y1) = self.view.map(rect.x + rect.w, rect.y + rect.h);
        (
            Self::span(x0, x1, self.cols),
            Self::span(y0, y1, self.px_height()),
        )
    }

    fn blend(&mut self, x: usize, y: usize, color: Rgba) {
        let i = y * self.cols + x;
        self.px[i] = color.over(self.px[i]);
    }

    fn clear(&mut self, color: Rgba) {
        self.px.fill(color.with_alpha(255));
        self.text.fill(None);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let (xs, ys) = self.pixel_bounds(rect);
        for y in ys {
            for x in xs.clone() {
                self.blend(x, y, color);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba) {
        let (xs, ys) = self.pixel_bounds(rect);
        if xs.is_empty() || ys.is_empty() {
            return;
        }
        let (left, right) = (xs.start, xs.end - 1);
        let (top, bottom) = (ys.start, ys.end - 1);
        for y in ys {
            for x in xs.clone() {
                if x == left || x == right || y == top || y == bottom {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn put_text(&mut self, text: &str, x: f32, y: f32, anchor: Anchor, color: Rgba) {
        let (cx, cy) = self.view.map(x, y);
        let len = text.chars().count() as f32;
        let col = match anchor {
            Anchor::TopLeft => cx.round(),
            Anchor::Center => (cx - len / 2.0).round(),
        };
        let row = (cy / 2.0).floor();
        if row < 0.0 || row as usize >= self.rows {
            return;
        }
        let row = row as usize;
        for (i, ch) in text.chars().enumerate() {
            let c = col + i as f32;
            if c < 0.0 || c as usize >= self.cols {
                continue;
            }
            self.text[row * self.cols + c as usize] = Some((ch, color));
        }
    }

    fn draw(&mut self, frame: &Frame) {
        for cmd in &frame.commands {
            match cmd {
                DrawCmd::Clear(color) => self.clear(*color),
                DrawCmd::FillRect(rect, color) => self.fill_rect(*rect, *color),
                DrawCmd::StrokeRect(rect, color) => self.stroke_rect(*rect, *color),
                DrawCmd::Text {
                    text,
                    x,
                    y,
                    anchor,
                    color,
                    ..
                } => self.put_text(text, *x, *y, *anchor, *color),
            }
        }
        if self.view.too_small() {
            self.text.fill(None);
            let (x, y) = (WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0);
            self.put_text("Enlarge the terminal", x, y, Anchor::Center, Rgba::WHITE);
        }
    }

    /// Collapse pixel pairs and text into terminal cells
    fn cell(&self, col: usize, row: usize) -> Cell {
        let top = self.px[(row * 2) * self.cols + col];
        let bottom = self.px[(row * 2 + 1) * self.cols + col];
        match self.text[row * self.cols + col] {
            Some((ch, color)) => Cell {
                ch,
                fg: color.over(top),
                bg: top,
            },
            None if top == bottom => Cell {
                ch: ' ',
                fg: top,
                bg: top,
            },
            None => Cell {
                ch: '▀',
                fg: top,
                bg: bottom,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    fg: Rgba,
    bg: Rgba,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Rgba::WHITE,
        bg: Rgba::BLACK,
    };
}

fn term_color(c: Rgba) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Run `restore` when a setup step failed, then pass the result on
fn or_restore<T>(result: Result<T>, restore: impl FnOnce()) -> Result<T> {
    if result.is_err() {
        restore();
    }
    result
}

/// In-memory log sink. Anything logged while the game owns the terminal
/// would land on top of the playfield, so it is held here and printed to
/// stderr once the terminal is restored.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Install `env_logger` (default filter `warn`, `RUST_LOG` respected)
    /// writing into this buffer
    pub fn init_logger(&self) {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .target(env_logger::Target::Pipe(Box::new(self.clone())))
            .init();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drain everything logged so far
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.lock());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn flush_to_stderr(&self) {
        let pending = self.take();
        if !pending.is_empty() {
            eprint!("{}", pending);
        }
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Alternate-screen terminal with a diffed cell buffer
struct Screen {
    out: Stdout,
    cols: u16,
    rows: u16,
    prev: Vec<Cell>,
    canvas: Canvas,
}

impl Screen {
    fn begin() -> Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode().context("could not enable raw mode")?;
        let entered = execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )
        .context("could not enter the alternate screen")
        .and_then(|_| terminal::size().context("could not query terminal size"));

        let (cols, rows) = or_restore(entered, || {
            let _ = execute!(io::stdout(), cursor::Show, EnableLineWrap, LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        })?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: vec![Cell::BLANK; cols as usize * rows as usize],
            canvas: Canvas::new(cols, rows),
        })
    }

    fn end(&mut self) -> Result<()> {
        queue!(
            self.out,
            ResetColor,
            terminal::Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        if cols == self.cols && rows == self.rows {
            return;
        }
        self.cols = cols;
        self.rows = rows;
        // Invalid prev forces a full repaint
        self.prev = vec![
            Cell {
                ch: '\0',
                ..Cell::BLANK
            };
            cols as usize * rows as usize
        ];
        self.canvas = Canvas::new(cols, rows);
    }

    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.canvas.draw(frame);

        queue!(self.out, BeginSynchronizedUpdate)?;
        let mut last_fg = None;
        let mut last_bg = None;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let i = row as usize * self.cols as usize + col as usize;
                let cell = self.canvas.cell(col as usize, row as usize);
                if cell == self.prev[i] {
                    continue;
                }
                queue!(self.out, cursor::MoveTo(col, row))?;
                if last_fg != Some(cell.fg) {
                    queue!(self.out, SetForegroundColor(term_color(cell.fg)))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.out, SetBackgroundColor(term_color(cell.bg)))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.out, Print(cell.ch))?;
                self.prev[i] = cell;
            }
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Key name in the spelling `command_for_key` expects
fn key_name(code: KeyCode, mods: KeyModifiers) -> Option<String> {
    match code {
        KeyCode::Char('c') if mods.contains(KeyModifiers::CONTROL) => Some("Escape".into()),
        KeyCode::Char(c) => Some(c.to_string()),
        KeyCode::Esc => Some("Escape".into()),
        _ => None,
    }
}

enum Pending {
    Key(String),
    Resize(u16, u16),
}

fn collect_input() -> Result<Vec<Pending>> {
    let mut out = Vec::new();
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(k) if k.kind == KeyEventKind::Press => {
                if let Some(name) = key_name(k.code, k.modifiers) {
                    out.push(Pending::Key(name));
                }
            }
            Event::Resize(w, h) => out.push(Pending::Resize(w, h)),
            _ => {}
        }
    }
    Ok(out)
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

fn print_banner() {
    println!("RGB Guardian");
    println!("============");
    println!("Stop the falling dots before they reach the bottom!");
    println!();
    println!("  R / G / B  clear the lowest dot if its color matches");
    println!("  P          pause / resume");
    println!("  SPACE      restart after game over");
    println!("  ESC        quit");
    println!();
    println!("Every 100 points is a new level: dots fall faster and spawn more often.");
    println!();
}

/// Frames rendered over the last second
struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            fps: 0,
        }
    }

    fn frame(&mut self) -> u32 {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.fps = (self.frames as f32 / elapsed.as_secs_f32()).round() as u32;
            self.frames = 0;
            self.window_start = Instant::now();
        }
        self.fps
    }
}

fn play(screen: &mut Screen, session: &mut Session, settings: &Settings, audio: &mut AudioManager) -> Result<()> {
    let budget = settings.frame_duration();
    let mut fps = FpsCounter::new();
    audio.start_music();

    while !session.quit {
        let frame_start = Instant::now();

        for pending in collect_input().context("could not read terminal input")? {
            match pending {
                Pending::Key(name) => {
                    session.handle_key(&name);
                }
                Pending::Resize(w, h) => screen.resize(w, h),
            }
        }
        if session.quit {
            break;
        }

        let events = session.step();
        audio.handle_events(&events);

        let options = session.scene_options(settings, Some(fps.frame()));
        let frame = build_frame(&session.state, &options);
        screen.present(&frame).context("could not draw to the terminal")?;

        if let Some(rest) = budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    audio.stop_music();
    Ok(())
}

/// Run the terminal game until the player quits. Log records are held in
/// `logs` while the game is on screen.
pub fn run(args: Args, logs: &LogBuffer) -> Result<()> {
    let settings = args.resolve_settings();
    let seed = settings.seed.unwrap_or_else(time_seed);
    log::info!("Starting with seed {} at {} fps", seed, settings.fps);

    print_banner();

    let mut audio = AudioManager::with_assets(&settings, &args.assets);
    let mut session = Session::new(seed);
    logs.flush_to_stderr();

    let mut screen = Screen::begin()?;
    let result = play(&mut screen, &mut session, &settings, &mut audio);
    let restored = screen.end().context("could not restore the terminal");
    logs.flush_to_stderr();

    // Report the game error first; a restore failure only matters on success
    result?;
    restored?;

    println!();
    print!("{}", session.summary());
    println!("Thanks for playing!");
    Ok(())
}
