//! Core types for the synchronization pipeline.

use std::path::{Path, PathBuf};
use std::thread;

use crate::analysis::AudioSignal;
use crate::config::Settings;
use crate::debug::DebugReport;
use crate::models::{CameraRecording, LagMap, NormalizedLagMap};
use crate::sync::SyncWindow;

use super::errors::{PipelineError, PipelineResult};

/// Read-only context passed to pipeline steps.
///
/// Holds the resolved folder layout and shared resources. Mutable state
/// accumulated across steps goes in [`RunState`].
pub struct Context {
    /// Application settings.
    pub settings: Settings,
    /// Run name, derived from the raw folder's name.
    pub run_name: String,
    /// Folder holding the raw camera recordings.
    pub raw_folder: PathBuf,
    /// Output folder for synchronized clips.
    pub synchronized_dir: PathBuf,
    /// Folder for per-camera extracted audio.
    pub audio_dir: PathBuf,
    /// Folder for lag-compensated trimmed audio.
    pub trimmed_audio_dir: PathBuf,
    /// Folder for framerate-normalized intermediates.
    pub normalized_dir: PathBuf,
    /// Worker pool for per-camera parallel work.
    pub pool: rayon::ThreadPool,
}

impl Context {
    /// Build a context for a raw recording folder.
    ///
    /// Output folders are siblings of the raw folder, inside the session
    /// directory (the raw folder's parent), and are created eagerly so
    /// steps never race on directory creation.
    pub fn new(raw_folder: &Path, settings: Settings) -> PipelineResult<Self> {
        let run_name = raw_folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sync".to_string());

        let session = raw_folder.parent().unwrap_or(raw_folder);
        let synchronized_dir = session.join(&settings.paths.synchronized_folder);
        let audio_dir = session.join(&settings.paths.audio_folder);
        let trimmed_audio_dir = audio_dir.join(&settings.paths.trimmed_audio_folder);
        let normalized_dir = session.join(&settings.paths.normalized_folder);

        for dir in [
            &synchronized_dir,
            &audio_dir,
            &trimmed_audio_dir,
            &normalized_dir,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| {
                PipelineError::setup_failed(
                    &run_name,
                    format!("could not create {}: {}", dir.display(), e),
                )
            })?;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count())
            .build()
            .map_err(|e| {
                PipelineError::setup_failed(&run_name, format!("could not build worker pool: {e}"))
            })?;

        Ok(Self {
            settings,
            run_name,
            raw_folder: raw_folder.to_path_buf(),
            synchronized_dir,
            audio_dir,
            trimmed_audio_dir,
            normalized_dir,
            pool,
        })
    }
}

/// One core is left free so the decode subprocesses stay responsive.
fn worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

/// Mutable run state accumulated by pipeline steps.
///
/// Each step writes its own section and reads what earlier steps
/// produced; nothing is overwritten once set.
#[derive(Default)]
pub struct RunState {
    /// Probed raw recordings, before any normalization.
    pub raw_recordings: Vec<CameraRecording>,
    /// The recordings the rest of the pipeline operates on. Starts as a
    /// copy of `raw_recordings`; replaced if rate normalization runs.
    pub recordings: Vec<CameraRecording>,
    /// Decoded audio per camera (audio method only).
    pub signals: Vec<(String, AudioSignal)>,
    /// Extracted WAV path per camera (audio method only).
    pub audio_paths: Vec<(String, PathBuf)>,
    /// Per-frame brightness series per camera (brightness method only),
    /// as `(camera, series, fps)`.
    pub brightness: Vec<(String, Vec<f64>, f64)>,
    /// Raw estimated lags.
    pub raw_lags: Option<LagMap>,
    /// Normalized lags (latest starter at zero).
    pub lags: Option<NormalizedLagMap>,
    /// Resolved common window and per-camera frame ranges.
    pub window: Option<SyncWindow>,
    /// Trimmed output path per camera.
    pub trimmed: Vec<(String, PathBuf)>,
    /// Re-probed metadata of the synchronized outputs.
    pub synchronized: Vec<CameraRecording>,
    /// Debug report accumulated across steps.
    pub report: DebugReport,
}

impl RunState {
    /// Look up the current recording for a camera.
    pub fn recording(&self, camera: &str) -> Option<&CameraRecording> {
        self.recordings.iter().find(|r| r.name == camera)
    }

    /// Look up the extracted WAV path for a camera.
    pub fn audio_path(&self, camera: &str) -> Option<&PathBuf> {
        self.audio_paths
            .iter()
            .find(|(name, _)| name == camera)
            .map(|(_, path)| path)
    }

    /// Whether lag estimation has run.
    pub fn has_lags(&self) -> bool {
        self.lags.is_some()
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step was skipped (preconditions made it unnecessary, not an error).
    Skipped(String),
}
