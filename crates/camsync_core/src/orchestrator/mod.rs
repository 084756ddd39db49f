//! Pipeline orchestrator coordinating a synchronization run.
//!
//! A run walks a fixed sequence of steps, each validating its inputs,
//! doing its work, and validating its outputs:
//!
//! ```text
//! Pipeline
//!     ├── Step: Probe
//!     ├── Step: NormalizeRates   (skipped when rates already agree)
//!     ├── Step: ExtractSignals
//!     ├── Step: EstimateLags
//!     ├── Step: ResolveWindow
//!     ├── Step: TrimVideos
//!     ├── Step: AttachAudio      (skipped for brightness-aligned runs)
//!     ├── Step: VerifyFrameCounts
//!     └── Step: DebugDump        (skipped when disabled in settings)
//! ```
//!
//! [`synchronize_folder`] is the high-level entry point a front-end
//! calls with a raw recording folder and settings.

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

use std::path::{Path, PathBuf};

use tracing::info;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{
    AttachAudioStep, DebugDumpStep, EstimateLagsStep, ExtractSignalsStep, NormalizeRatesStep,
    ProbeStep, ResolveWindowStep, TrimVideosStep, VerifyFrameCountsStep,
};
pub use types::{Context, RunState, StepOutcome};

use crate::config::Settings;

/// Create the standard pipeline with all steps in execution order.
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(ProbeStep::new())
        .with_step(NormalizeRatesStep::new())
        .with_step(ExtractSignalsStep::new())
        .with_step(EstimateLagsStep::new())
        .with_step(ResolveWindowStep::new())
        .with_step(TrimVideosStep::new())
        .with_step(AttachAudioStep::new())
        .with_step(VerifyFrameCountsStep::new())
        .with_step(DebugDumpStep::new())
}

/// Synchronize every camera recording found in `raw_folder`.
///
/// Output folders are created as siblings of the raw folder. Returns
/// the folder holding the synchronized clips.
pub fn synchronize_folder(raw_folder: &Path, settings: Settings) -> PipelineResult<PathBuf> {
    let ctx = Context::new(raw_folder, settings)?;
    let mut state = RunState::default();

    let pipeline = create_standard_pipeline();
    let result = pipeline.run(&ctx, &mut state)?;
    info!(
        "Synchronized {} camera(s): {} step(s) completed, {} skipped",
        state.recordings.len(),
        result.steps_completed.len(),
        result.steps_skipped.len()
    );

    Ok(ctx.synchronized_dir)
}
