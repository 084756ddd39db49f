//! Verification step - asserts frame-count equality across outputs.
//!
//! Synchronization is only correct if every output clip holds exactly
//! the same number of frames. Each output is re-probed (decoding frame
//! counts rather than trusting container metadata) and compared against
//! the others; the re-probed metadata is kept for the debug report.

use rayon::prelude::*;
use tracing::info;

use crate::media::probe::{count_frames, probe_recording};
use crate::media::MediaError;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct VerifyFrameCountsStep;

impl VerifyFrameCountsStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VerifyFrameCountsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for VerifyFrameCountsStep {
    fn name(&self) -> &str {
        "VerifyFrameCounts"
    }

    fn description(&self) -> &str {
        "Check that every synchronized clip has the same frame count"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.trimmed.is_empty() {
            return Err(StepError::precondition_failed("no trimmed clips"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let probed = ctx.pool.install(|| {
            state
                .trimmed
                .par_iter()
                .map(|(camera, path)| {
                    let frames = count_frames(path)?;
                    let recording = probe_recording(path)?;
                    Ok::<_, MediaError>((camera.clone(), frames, recording))
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        let counts: Vec<(String, u64)> = probed
            .iter()
            .map(|(camera, frames, _)| (camera.clone(), *frames))
            .collect();
        for (camera, frames) in &counts {
            info!("{}: {} frames", camera, frames);
        }

        let first = counts[0].1;
        if counts.iter().any(|(_, frames)| *frames != first) {
            return Err(StepError::invalid_output(format!(
                "synchronized clips disagree on frame count: {counts:?}"
            )));
        }

        for (_, _, recording) in &probed {
            state.report.add_synchronized(recording);
        }
        state.synchronized = probed
            .into_iter()
            .map(|(_, _, recording)| recording)
            .collect();

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.synchronized.len() != state.trimmed.len() {
            return Err(StepError::invalid_output("outputs not re-probed"));
        }
        Ok(())
    }
}
