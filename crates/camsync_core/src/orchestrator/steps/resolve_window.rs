//! Window resolution step - maps lags to per-camera frame ranges.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};
use crate::sync::window::resolve;

pub struct ResolveWindowStep;

impl ResolveWindowStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResolveWindowStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ResolveWindowStep {
    fn name(&self) -> &str {
        "ResolveWindow"
    }

    fn description(&self) -> &str {
        "Resolve the common overlap window and frame ranges"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if !state.has_lags() {
            return Err(StepError::precondition_failed("lags not estimated"));
        }
        Ok(())
    }

    fn execute(&self, _ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        // Presence checked in validate_input.
        let lags = state
            .lags
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("lags not estimated"))?;
        let window = resolve(&state.recordings, lags)?;
        state.window = Some(window);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let window = state
            .window
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("window not recorded"))?;
        if window.frame_count == 0 {
            return Err(StepError::invalid_output(
                "common window shorter than one frame",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_step_has_correct_name() {
        assert_eq!(ResolveWindowStep::new().name(), "ResolveWindow");
    }
}
