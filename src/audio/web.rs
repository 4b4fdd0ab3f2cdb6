//! Audio system using Web Audio API
//!
//! Effects are played from the procedural recipes; music streams from an
//! `<audio>` element and simply stays silent if the file is missing.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

use super::{AudioOutput, MUSIC_PATH, Mixer, SoundEffect, Tone, Waveform, recipe};
use crate::settings::Settings;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    mixer: Mixer,
    music: Option<HtmlAudioElement>,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }

        let music = match HtmlAudioElement::new_with_src(MUSIC_PATH) {
            Ok(el) => {
                el.set_loop(true);
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    log::warn!("Background music unavailable ({})", MUSIC_PATH);
                });
                let _ = el.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref());
                closure.forget();
                Some(el)
            }
            Err(e) => {
                log::warn!("Could not create music element: {:?}", e);
                None
            }
        };

        Self {
            ctx,
            mixer: Mixer::from_settings(settings),
            music,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.mixer.muted = muted;
        if let Some(music) = &self.music {
            music.set_muted(muted);
        }
    }

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_tone(&self, ctx: &AudioContext, tone: &Tone, vol: f32) {
        let osc_type = match tone.wave {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Triangle => OscillatorType::Triangle,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        };
        let Some((osc, gain)) = self.create_osc(ctx, tone.freq_start, osc_type) else {
            return;
        };

        let t = ctx.current_time() + f64::from(tone.delay);
        let end = t + f64::from(tone.duration);

        gain.gain().set_value_at_time(0.0, ctx.current_time()).ok();
        gain.gain().set_value_at_time(vol * tone.gain, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
        if tone.freq_end != tone.freq_start {
            osc.frequency().set_value_at_time(tone.freq_start, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(tone.freq_end, end)
                .ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(end + 0.02).ok();
    }
}

impl AudioOutput for AudioManager {
    fn play(&self, effect: SoundEffect) {
        let vol = self.mixer.sfx_gain();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        for tone in recipe(effect) {
            self.play_tone(ctx, tone, vol);
        }
    }

    fn start_music(&mut self) {
        if let Some(music) = &self.music {
            music.set_volume(f64::from(self.mixer.music_gain()));
            music.set_current_time(0.0);
            play_quietly(music);
        }
    }

    fn pause_music(&mut self) {
        if let Some(music) = &self.music {
            let _ = music.pause();
        }
    }

    fn resume_music(&mut self) {
        if let Some(music) = &self.music {
            play_quietly(music);
        }
    }

    fn stop_music(&mut self) {
        if let Some(music) = &self.music {
            let _ = music.pause();
            music.set_current_time(0.0);
        }
    }
}

/// Start playback, swallowing the rejection browsers raise when autoplay is
/// blocked or the file is missing
fn play_quietly(music: &HtmlAudioElement) {
    if let Ok(promise) = music.play() {
        let on_reject = Closure::<dyn FnMut(_)>::new(|e: wasm_bindgen::JsValue| {
            log::debug!("Music did not start: {:?}", e);
        });
        let _ = promise.catch(&on_reject);
        on_reject.forget();
    }
}
