//! Native audio through rodio

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::{AudioOutput, MUSIC_PATH, Mixer, SoundEffect, render_samples};
use crate::settings::Settings;

const SAMPLE_RATE: u32 = 44_100;

/// Audio manager for the game
pub struct AudioManager {
    // Dropping the stream stops all output, so it lives as long as the manager
    output: Option<(OutputStream, OutputStreamHandle)>,
    mixer: Mixer,
    /// Clip bytes loaded from disk, decoded per play
    clips: HashMap<SoundEffect, Vec<u8>>,
    /// Synthesized fallbacks
    synth: HashMap<SoundEffect, Vec<f32>>,
    music_path: PathBuf,
    music: Option<Sink>,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        Self::with_assets(settings, Path::new("."))
    }

    /// Look for clips/music relative to `root`
    pub fn with_assets(settings: &Settings, root: &Path) -> Self {
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(e) => {
                log::warn!("No audio output device ({}); audio disabled", e);
                None
            }
        };

        let mut clips = HashMap::new();
        let mut missing = Vec::new();
        for effect in SoundEffect::ALL {
            let path = root.join(effect.asset_path());
            match std::fs::read(&path) {
                Ok(bytes) => {
                    clips.insert(effect, bytes);
                }
                Err(_) => missing.push(effect),
            }
        }
        if !missing.is_empty() {
            log::info!("Synthesizing sound effects with no clip on disk: {:?}", missing);
        }

        let synth = missing
            .into_iter()
            .map(|effect| (effect, render_samples(effect, SAMPLE_RATE)))
            .collect();

        Self {
            output,
            mixer: Mixer::from_settings(settings),
            clips,
            synth,
            music_path: root.join(MUSIC_PATH),
            music: None,
        }
    }

    fn new_sink(&self) -> Option<Sink> {
        let (_, handle) = self.output.as_ref()?;
        Sink::try_new(handle)
            .map_err(|e| log::warn!("Could not open audio sink: {}", e))
            .ok()
    }
}

impl AudioOutput for AudioManager {
    fn play(&self, effect: SoundEffect) {
        let vol = self.mixer.sfx_gain();
        if vol <= 0.0 {
            return;
        }
        let Some(sink) = self.new_sink() else { return };
        sink.set_volume(vol);

        if let Some(bytes) = self.clips.get(&effect) {
            match Decoder::new(Cursor::new(bytes.clone())) {
                Ok(source) => sink.append(source),
                Err(e) => {
                    log::warn!("Could not decode {}: {}", effect.asset_path(), e);
                    return;
                }
            }
        } else if let Some(samples) = self.synth.get(&effect) {
            sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.clone()));
        }
        sink.detach();
    }

    fn start_music(&mut self) {
        self.stop_music();

        let file = match File::open(&self.music_path) {
            Ok(file) => file,
            Err(_) => {
                log::debug!("No background music at {}", self.music_path.display());
                return;
            }
        };
        let source = match Decoder::new_looped(BufReader::new(file)) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Could not decode {}: {}", self.music_path.display(), e);
                return;
            }
        };
        let Some(sink) = self.new_sink() else { return };
        sink.set_volume(self.mixer.music_gain());
        sink.append(source);
        log::info!("Background music loaded");
        self.music = Some(sink);
    }

    fn pause_music(&mut self) {
        if let Some(sink) = &self.music {
            sink.pause();
        }
    }

    fn resume_music(&mut self) {
        if let Some(sink) = &self.music {
            sink.play();
        }
    }

    fn stop_music(&mut self) {
        if let Some(sink) = self.music.take() {
            sink.stop();
        }
    }
}
