//! Game settings and preferences
//!
//! Native builds read a JSON file passed on the command line; web builds
//! read LocalStorage. Missing or malformed settings fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::consts::FPS;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Pause when the window/tab loses focus
    pub mute_on_blur: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// No pulsing on fast dots
    pub reduced_motion: bool,

    // === Loop ===
    /// Frame cap for the native loop
    pub fps: u32,
    /// Fixed RNG seed (random per launch when unset)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            mute_on_blur: true,

            show_fps: false,

            reduced_motion: false,

            fps: FPS,
            seed: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; unknown keys are ignored, missing keys default
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::sanitized)
    }

    /// Clamp values into their valid ranges
    pub fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.fps = self.fps.clamp(10, 240);
        self
    }

    /// Frame budget for the native loop
    pub fn frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rgb_guardian_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring invalid stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings file {}: {} (using defaults)", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read settings file {}: {} (using defaults)", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "music_volume": 0.25, "seed": 7 }"#).unwrap();
        assert_eq!(settings.music_volume, 0.25);
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.fps, FPS);
        assert!(settings.mute_on_blur);
    }

    #[test]
    fn test_values_are_clamped() {
        let settings =
            Settings::from_json(r#"{ "master_volume": 3.0, "sfx_volume": -1.0, "fps": 5 }"#)
                .unwrap();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        assert_eq!(settings.fps, 10);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from(std::path::Path::new("/nonexistent/rgb-guardian.json"));
        assert_eq!(settings, Settings::default());
    }
}
