//! Audio: sound effects and background music
//!
//! Effects are described as small procedural tone recipes so the game works
//! without any asset files. Backends:
//! - `web`: Web Audio oscillators, `<audio>` element for music
//! - `native`: rodio, preferring `assets/*.wav` clips when they exist
//!
//! A missing device or asset only ever makes the game quieter.

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::AudioManager;
#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Background music asset (looped)
pub const MUSIC_PATH: &str = "assets/bg_music.ogg";

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Dot cleared with the right key
    Correct,
    /// Wrong key pressed
    Wrong,
    /// Dot reached the buttons
    Miss,
    /// Level up
    LevelUp,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 4] = [
        SoundEffect::Correct,
        SoundEffect::Wrong,
        SoundEffect::Miss,
        SoundEffect::LevelUp,
    ];

    /// Optional clip that replaces the synthesized recipe
    pub fn asset_path(self) -> &'static str {
        match self {
            SoundEffect::Correct => "assets/correct.wav",
            SoundEffect::Wrong => "assets/wrong.wav",
            SoundEffect::Miss => "assets/miss.wav",
            SoundEffect::LevelUp => "assets/levelup.wav",
        }
    }

    /// Sound cue for a simulation event
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Cleared { .. } => Some(SoundEffect::Correct),
            GameEvent::WrongColor { .. } => Some(SoundEffect::Wrong),
            GameEvent::Missed { .. } => Some(SoundEffect::Miss),
            GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
            _ => None,
        }
    }
}

/// Oscillator shapes available on both backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    /// Sample at `phase` in cycles (fractional part is used)
    pub fn sample(self, phase: f32) -> f32 {
        let p = phase.fract();
        match self {
            Waveform::Sine => (p * std::f32::consts::TAU).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * p - 1.0,
        }
    }
}

/// One oscillator voice: exponential pitch sweep with a decaying envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub wave: Waveform,
    pub freq_start: f32,
    pub freq_end: f32,
    /// Seconds after the trigger before this voice starts
    pub delay: f32,
    /// Seconds
    pub duration: f32,
    pub gain: f32,
}

impl Tone {
    const fn new(wave: Waveform, freq_start: f32, freq_end: f32, delay: f32, duration: f32, gain: f32) -> Self {
        Self {
            wave,
            freq_start,
            freq_end,
            delay,
            duration,
            gain,
        }
    }

    pub fn end(&self) -> f32 {
        self.delay + self.duration
    }

    /// Frequency `t` seconds into the voice
    pub fn freq_at(&self, t: f32) -> f32 {
        let u = (t / self.duration).clamp(0.0, 1.0);
        self.freq_start * (self.freq_end / self.freq_start).powf(u)
    }

    /// Envelope `t` seconds into the voice: 5 ms attack, then decay to silence
    pub fn envelope_at(&self, t: f32) -> f32 {
        if t < 0.0 || t > self.duration {
            return 0.0;
        }
        let attack = 0.005_f32.min(self.duration);
        if t < attack {
            return self.gain * t / attack;
        }
        let u = (t - attack) / (self.duration - attack).max(f32::EPSILON);
        self.gain * (1.0 - u).powi(2)
    }
}

const CORRECT: [Tone; 2] = [
    Tone::new(Waveform::Sine, 660.0, 660.0, 0.0, 0.08, 0.4),
    Tone::new(Waveform::Sine, 990.0, 990.0, 0.06, 0.14, 0.35),
];

const WRONG: [Tone; 2] = [
    Tone::new(Waveform::Sawtooth, 220.0, 110.0, 0.0, 0.3, 0.3),
    Tone::new(Waveform::Square, 160.0, 80.0, 0.0, 0.3, 0.12),
];

const MISS: [Tone; 2] = [
    Tone::new(Waveform::Triangle, 400.0, 80.0, 0.0, 0.45, 0.45),
    Tone::new(Waveform::Sine, 90.0, 50.0, 0.05, 0.4, 0.3),
];

// C major arpeggio
const LEVEL_UP: [Tone; 4] = [
    Tone::new(Waveform::Triangle, 523.25, 523.25, 0.0, 0.12, 0.3),
    Tone::new(Waveform::Triangle, 659.25, 659.25, 0.08, 0.12, 0.3),
    Tone::new(Waveform::Triangle, 783.99, 783.99, 0.16, 0.12, 0.3),
    Tone::new(Waveform::Triangle, 1046.5, 1046.5, 0.24, 0.3, 0.35),
];

/// Procedural recipe for an effect
pub fn recipe(effect: SoundEffect) -> &'static [Tone] {
    match effect {
        SoundEffect::Correct => &CORRECT,
        SoundEffect::Wrong => &WRONG,
        SoundEffect::Miss => &MISS,
        SoundEffect::LevelUp => &LEVEL_UP,
    }
}

/// Render an effect's recipe to mono samples in [-1, 1]
pub fn render_samples(effect: SoundEffect, sample_rate: u32) -> Vec<f32> {
    let tones = recipe(effect);
    let total = tones.iter().map(Tone::end).fold(0.0, f32::max);
    let count = (total * sample_rate as f32).ceil() as usize;
    let dt = 1.0 / sample_rate as f32;

    let mut samples = vec![0.0f32; count];
    for tone in tones {
        let start = (tone.delay * sample_rate as f32) as usize;
        let len = (tone.duration * sample_rate as f32) as usize;
        let mut phase = 0.0f32;
        for i in 0..len {
            let Some(out) = samples.get_mut(start + i) else {
                break;
            };
            let t = i as f32 * dt;
            *out += tone.wave.sample(phase) * tone.envelope_at(t);
            phase += tone.freq_at(t) * dt;
        }
    }

    for s in &mut samples {
        *s = s.clamp(-1.0, 1.0);
    }
    samples
}

/// Volume state shared by both backends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    pub master: f32,
    pub sfx: f32,
    pub music: f32,
    pub muted: bool,
}

impl Mixer {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            master: settings.master_volume.clamp(0.0, 1.0),
            sfx: settings.sfx_volume.clamp(0.0, 1.0),
            music: settings.music_volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    pub fn sfx_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.master * self.sfx }
    }

    pub fn music_gain(&self) -> f32 {
        if self.muted { 0.0 } else { self.master * self.music }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Playback surface the frontends drive
pub trait AudioOutput {
    fn play(&self, effect: SoundEffect);
    fn start_music(&mut self);
    fn pause_music(&mut self);
    fn resume_music(&mut self);
    fn stop_music(&mut self);

    /// React to everything a tick reported
    fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.play(effect);
            }
            match event {
                GameEvent::Paused => self.pause_music(),
                GameEvent::Resumed => self.resume_music(),
                GameEvent::GameOver { .. } => self.stop_music(),
                GameEvent::Restarted => self.start_music(),
                _ => {}
            }
        }
    }
}
