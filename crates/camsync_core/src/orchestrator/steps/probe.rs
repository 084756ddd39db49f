//! Probe step - discovers and probes the raw camera recordings.

use rayon::prelude::*;
use tracing::info;

use crate::discovery::find_video_files;
use crate::media::probe::probe_recording;
use crate::media::tools::{check_for_ffmpeg, check_for_ffprobe};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};
use crate::sync::SyncError;

/// Discovers the camera recordings in the raw folder and probes each
/// one for duration, frame rate, dimensions, rotation, and audio.
pub struct ProbeStep;

impl ProbeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProbeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ProbeStep {
    fn name(&self) -> &str {
        "Probe"
    }

    fn description(&self) -> &str {
        "Discover and probe raw camera recordings"
    }

    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if !ctx.raw_folder.is_dir() {
            return Err(StepError::invalid_input(format!(
                "raw folder does not exist: {}",
                ctx.raw_folder.display()
            )));
        }
        check_for_ffmpeg()?;
        check_for_ffprobe()?;
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let paths = find_video_files(&ctx.raw_folder)
            .map_err(|e| StepError::io("scanning raw folder", e))?;

        if paths.is_empty() {
            return Err(SyncError::NoCameras.into());
        }

        info!(
            "Found {} camera recording(s) in {}",
            paths.len(),
            ctx.raw_folder.display()
        );

        let recordings = ctx.pool.install(|| {
            paths
                .par_iter()
                .map(|path| probe_recording(path))
                .collect::<Result<Vec<_>, _>>()
        })?;

        for recording in &recordings {
            info!(
                "{}: {:.2}s at {:.3} fps, {}x{}, audio: {}",
                recording.name,
                recording.duration_secs,
                recording.fps,
                recording.width,
                recording.height,
                recording
                    .sample_rate
                    .map(|r| format!("{r} Hz"))
                    .unwrap_or_else(|| "none".to_string()),
            );
            state.report.add_raw(recording);
        }

        state.raw_recordings = recordings.clone();
        state.recordings = recordings;
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.recordings.is_empty() {
            return Err(StepError::invalid_output("no recordings probed"));
        }
        Ok(())
    }
}
