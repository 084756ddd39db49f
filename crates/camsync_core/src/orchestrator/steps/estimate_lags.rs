//! Lag estimation step - derives and normalizes per-camera lags.

use tracing::info;

use crate::models::AlignmentMethod;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};
use crate::sync::lags::{brightness_lags, cross_correlation_lags, normalize};

pub struct EstimateLagsStep;

impl EstimateLagsStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EstimateLagsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for EstimateLagsStep {
    fn name(&self) -> &str {
        "EstimateLags"
    }

    fn description(&self) -> &str {
        "Estimate and normalize per-camera start offsets"
    }

    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        let ready = if ctx.settings.analysis.method.requires_audio() {
            !state.signals.is_empty()
        } else {
            !state.brightness.is_empty()
        };
        if !ready {
            return Err(StepError::precondition_failed("signals not extracted"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let raw = match ctx.settings.analysis.method {
            AlignmentMethod::AudioCrossCorrelation => cross_correlation_lags(&state.signals)?,
            AlignmentMethod::BrightnessChange => brightness_lags(
                &state.brightness,
                ctx.settings.analysis.brightness_threshold,
            )?,
        };

        let normalized = normalize(&raw)?;
        for (camera, lag) in normalized.iter() {
            info!("{}: trim {:.3}s of leading footage", camera, lag);
        }

        state.report.set_lags(&normalized);
        state.raw_lags = Some(raw);
        state.lags = Some(normalized);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let lags = state
            .lags
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("lags not recorded"))?;
        if lags.len() != state.recordings.len() {
            return Err(StepError::invalid_output(format!(
                "{} lag(s) for {} camera(s)",
                lags.len(),
                state.recordings.len()
            )));
        }
        Ok(())
    }
}
