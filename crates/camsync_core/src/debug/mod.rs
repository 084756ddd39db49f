//! Debug dump of a synchronization run.
//!
//! After a run finishes, a `synchronization_debug.toml` is written next to
//! the synchronized output. It records the probed state of the raw clips,
//! the re-probed state of the trimmed clips, audio metadata, and the
//! normalized lag per camera. Signal sample data never goes into the dump;
//! when signal retention is enabled the arrays are persisted separately as
//! binary/JSON artifacts by the steps that produce them.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{CameraRecording, NormalizedLagMap};

/// Filename of the per-run debug dump.
pub const DEBUG_DUMP_NAME: &str = "synchronization_debug.toml";

/// Errors from writing the debug dump.
#[derive(Debug, Error)]
pub enum DebugError {
    #[error("failed to serialize debug report: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write debug report: {0}")]
    Io(#[from] io::Error),
}

/// Audio metadata recorded per camera. Sample arrays are deliberately
/// excluded so the dump stays small enough to read by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioMeta {
    /// Sample rate the waveform was decoded at, in Hz.
    pub sample_rate: u32,
    /// Duration of the decoded waveform in seconds.
    pub duration_secs: f64,
}

/// Everything the dump records about one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugReport {
    /// When the run started, RFC 3339 local time.
    #[serde(default)]
    pub started_at: String,

    /// Probed metadata of each input clip, before any trimming.
    #[serde(rename = "Raw_video_information")]
    pub raw_video_information: BTreeMap<String, CameraRecording>,

    /// Re-probed metadata of each synchronized output clip.
    #[serde(rename = "Synchronized_video_information")]
    pub synchronized_video_information: BTreeMap<String, CameraRecording>,

    /// Per-camera audio metadata; empty for brightness-based runs.
    #[serde(rename = "Audio_information")]
    pub audio_information: BTreeMap<String, AudioMeta>,

    /// Normalized lag in seconds per camera.
    #[serde(rename = "Lag_dictionary")]
    pub lag_dictionary: BTreeMap<String, f64>,
}

impl Default for DebugReport {
    fn default() -> Self {
        Self {
            started_at: chrono::Local::now().to_rfc3339(),
            raw_video_information: BTreeMap::new(),
            synchronized_video_information: BTreeMap::new(),
            audio_information: BTreeMap::new(),
            lag_dictionary: BTreeMap::new(),
        }
    }
}

impl DebugReport {
    /// Record a raw input recording.
    pub fn add_raw(&mut self, recording: &CameraRecording) {
        self.raw_video_information
            .insert(recording.name.clone(), recording.clone());
    }

    /// Record a synchronized output recording.
    pub fn add_synchronized(&mut self, recording: &CameraRecording) {
        self.synchronized_video_information
            .insert(recording.name.clone(), recording.clone());
    }

    /// Record audio metadata for a camera.
    pub fn add_audio(&mut self, camera: impl Into<String>, meta: AudioMeta) {
        self.audio_information.insert(camera.into(), meta);
    }

    /// Record the normalized lag map.
    pub fn set_lags(&mut self, lags: &NormalizedLagMap) {
        self.lag_dictionary = lags.as_map().clone();
    }

    /// Write the dump as TOML into `folder`, returning the written path.
    pub fn write_to(&self, folder: &Path) -> Result<PathBuf, DebugError> {
        let path = folder.join(DEBUG_DUMP_NAME);
        let rendered = toml::to_string_pretty(self)?;
        fs::write(&path, rendered)?;
        info!(path = %path.display(), "wrote synchronization debug report");
        Ok(path)
    }
}
