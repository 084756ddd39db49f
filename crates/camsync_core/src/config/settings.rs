//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field carries a serde default so partial config files parse.

use serde::{Deserialize, Serialize};

use crate::models::{AlignmentMethod, TrimMode};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Output folder naming.
    #[serde(default)]
    pub paths: PathSettings,

    /// Lag estimation settings.
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Trim executor settings.
    #[serde(default)]
    pub trim: TrimSettings,

    /// Debug artifact settings.
    #[serde(default)]
    pub debug: DebugSettings,
}

/// Folder names created under the session directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for trimmed, synchronized output videos.
    #[serde(default = "default_synchronized_folder")]
    pub synchronized_folder: String,

    /// Folder for per-camera extracted audio.
    #[serde(default = "default_audio_folder")]
    pub audio_folder: String,

    /// Subfolder of the audio folder for lag-compensated trimmed audio.
    #[serde(default = "default_trimmed_audio_folder")]
    pub trimmed_audio_folder: String,

    /// Folder for framerate-normalized intermediate videos.
    #[serde(default = "default_normalized_folder")]
    pub normalized_folder: String,
}

fn default_synchronized_folder() -> String {
    "synchronized_videos".to_string()
}

fn default_audio_folder() -> String {
    "audio_files".to_string()
}

fn default_trimmed_audio_folder() -> String {
    "trimmed_audio".to_string()
}

fn default_normalized_folder() -> String {
    "normalized_videos".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            synchronized_folder: default_synchronized_folder(),
            audio_folder: default_audio_folder(),
            trimmed_audio_folder: default_trimmed_audio_folder(),
            normalized_folder: default_normalized_folder(),
        }
    }
}

/// Lag estimation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Alignment method used to derive per-camera lags.
    #[serde(default)]
    pub method: AlignmentMethod,

    /// Threshold for the combined brightness-acceleration metric.
    ///
    /// An event at or above this value is treated as a deliberate sync
    /// marker (e.g. a flash) rather than noise.
    #[serde(default = "default_brightness_threshold")]
    pub brightness_threshold: f64,

    /// Sample rate used when normalizing cameras that have no audio.
    #[serde(default = "default_fallback_sample_rate")]
    pub fallback_sample_rate: u32,
}

fn default_brightness_threshold() -> f64 {
    1000.0
}

fn default_fallback_sample_rate() -> u32 {
    44100
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            method: AlignmentMethod::default(),
            brightness_threshold: default_brightness_threshold(),
            fallback_sample_rate: default_fallback_sample_rate(),
        }
    }
}

/// Trim executor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrimSettings {
    /// Backend producing the trimmed output clips.
    #[serde(default)]
    pub backend: TrimMode,
}

/// Debug artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugSettings {
    /// Write the synchronization debug TOML after a run.
    #[serde(default = "default_true")]
    pub write_debug_dump: bool,

    /// Keep persisted per-camera signal series (brightness curves) on disk
    /// after the run, for external plotting.
    #[serde(default)]
    pub keep_signal_data: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            write_debug_dump: true,
            keep_signal_data: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.analysis.method, AlignmentMethod::AudioCrossCorrelation);
        assert!((settings.analysis.brightness_threshold - 1000.0).abs() < f64::EPSILON);
        assert_eq!(settings.analysis.fallback_sample_rate, 44100);
        assert_eq!(settings.trim.backend, TrimMode::FrameIndexed);
        assert_eq!(settings.paths.synchronized_folder, "synchronized_videos");
        assert!(settings.debug.write_debug_dump);
        assert!(!settings.debug.keep_signal_data);
    }

    #[test]
    fn partial_toml_fills_missing_sections() {
        let text = "[analysis]\nmethod = \"brightness\"\nbrightness_threshold = 500.0\n";
        let settings: Settings = toml::from_str(text).unwrap();
        assert_eq!(settings.analysis.method, AlignmentMethod::BrightnessChange);
        assert!((settings.analysis.brightness_threshold - 500.0).abs() < f64::EPSILON);
        // Untouched sections get defaults.
        assert_eq!(settings.trim.backend, TrimMode::FrameIndexed);
        assert_eq!(settings.paths.audio_folder, "audio_files");
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.analysis.brightness_threshold = 1234.5;
        settings.trim.backend = TrimMode::TimeBased;

        let text = toml::to_string(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert!((parsed.analysis.brightness_threshold - 1234.5).abs() < f64::EPSILON);
        assert_eq!(parsed.trim.backend, TrimMode::TimeBased);
    }
}
