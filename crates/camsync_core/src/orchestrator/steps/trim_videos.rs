//! Trim step - writes each camera's synchronized clip.

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::info;

use crate::discovery::synced_name;
use crate::media::MediaError;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};
use crate::trim::create_trimmer;

pub struct TrimVideosStep;

impl TrimVideosStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TrimVideosStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for TrimVideosStep {
    fn name(&self) -> &str {
        "TrimVideos"
    }

    fn description(&self) -> &str {
        "Trim each camera to its synchronized frame range"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.window.is_none() {
            return Err(StepError::precondition_failed("window not resolved"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let window = state
            .window
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("window not resolved"))?;
        let trimmer = create_trimmer(ctx.settings.trim.backend);
        info!(
            "Trimming {} camera(s) with the {} backend",
            state.recordings.len(),
            trimmer.name()
        );

        let trimmed = ctx.pool.install(|| {
            state
                .recordings
                .par_iter()
                .map(|recording| {
                    let range = window.range_for(&recording.name).ok_or_else(|| {
                        MediaError::parse(
                            "frame range",
                            format!("no range for camera '{}'", recording.name),
                        )
                    })?;
                    let output = ctx.synchronized_dir.join(synced_name(&recording.path));
                    info!(
                        "{}: frames [{}, {}) -> {}",
                        recording.name,
                        range.start_frame,
                        range.end_frame(),
                        output.display()
                    );
                    trimmer.trim(recording, &range, &output)?;
                    Ok::<_, MediaError>((recording.name.clone(), output))
                })
                .collect::<Result<Vec<(String, PathBuf)>, _>>()
        })?;

        state.trimmed = trimmed;
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.trimmed.len() != state.recordings.len() {
            return Err(StepError::invalid_output(format!(
                "wrote {} clip(s) for {} camera(s)",
                state.trimmed.len(),
                state.recordings.len()
            )));
        }
        for (camera, path) in &state.trimmed {
            if !path.is_file() {
                return Err(StepError::invalid_output(format!(
                    "missing trimmed output for '{camera}': {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}
