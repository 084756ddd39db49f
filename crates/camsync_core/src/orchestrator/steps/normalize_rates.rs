//! Rate normalization step - re-encodes cameras onto shared rates.
//!
//! Correlation and frame mapping both assume one frame rate and one
//! sample rate across cameras. When the probed recordings already agree
//! this step skips; otherwise every camera is re-encoded to the minimum
//! common rates and the pipeline continues on the regenerated files.

use tracing::warn;

use crate::normalize::{normalize_recordings, rates_are_uniform};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct NormalizeRatesStep;

impl NormalizeRatesStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NormalizeRatesStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for NormalizeRatesStep {
    fn name(&self) -> &str {
        "NormalizeRates"
    }

    fn description(&self) -> &str {
        "Re-encode cameras onto a shared frame rate and sample rate"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.recordings.is_empty() {
            return Err(StepError::precondition_failed("recordings not probed"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if rates_are_uniform(&state.recordings) {
            return Ok(StepOutcome::Skipped(
                "all cameras share one frame rate and sample rate".to_string(),
            ));
        }

        warn!("Cameras disagree on rates; re-encoding to minimum common values");
        let normalized = normalize_recordings(
            &state.recordings,
            &ctx.normalized_dir,
            ctx.settings.analysis.fallback_sample_rate,
        )?;

        state.recordings = normalized;
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if !rates_are_uniform(&state.recordings) {
            return Err(StepError::invalid_output(
                "recordings still disagree on rates after normalization",
            ));
        }
        Ok(())
    }
}
