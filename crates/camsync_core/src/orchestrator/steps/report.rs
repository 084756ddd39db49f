//! Report step - writes the debug dump and cleans up signal artifacts.

use std::fs;

use tracing::debug;

use crate::analysis::brightness::series_path;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct DebugDumpStep;

impl DebugDumpStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DebugDumpStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for DebugDumpStep {
    fn name(&self) -> &str {
        "DebugDump"
    }

    fn description(&self) -> &str {
        "Write the synchronization debug report"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.synchronized.is_empty() {
            return Err(StepError::precondition_failed("outputs not verified"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if !ctx.settings.debug.keep_signal_data {
            for recording in &state.recordings {
                let series = series_path(&recording.path);
                if series.exists() {
                    debug!("Removing signal artifact {}", series.display());
                    let _ = fs::remove_file(series);
                }
            }
        }

        if !ctx.settings.debug.write_debug_dump {
            return Ok(StepOutcome::Skipped(
                "debug dump disabled in settings".to_string(),
            ));
        }

        state.report.write_to(&ctx.synchronized_dir)?;
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        let path = ctx.synchronized_dir.join(crate::debug::DEBUG_DUMP_NAME);
        if !path.is_file() {
            return Err(StepError::invalid_output(format!(
                "debug dump missing: {}",
                path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_step_has_correct_name() {
        assert_eq!(DebugDumpStep::new().name(), "DebugDump");
    }
}
