//! Audio reattachment step - puts lag-compensated audio on the clips.
//!
//! Trim backends write video-only output. For audio-aligned runs, each
//! camera's extracted WAV is cut to the same window as its video and
//! muxed back in with a stream copy, so the video frames written by the
//! trimmer are untouched.

use std::fs;

use rayon::prelude::*;
use tracing::info;

use crate::media::audio::trim_audio_file;
use crate::media::mux::attach_audio;
use crate::media::MediaError;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct AttachAudioStep;

impl AttachAudioStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AttachAudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AttachAudioStep {
    fn name(&self) -> &str {
        "AttachAudio"
    }

    fn description(&self) -> &str {
        "Reattach lag-compensated audio to the trimmed clips"
    }

    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.trimmed.is_empty() {
            return Err(StepError::precondition_failed("no trimmed clips"));
        }
        if ctx.settings.analysis.method.requires_audio() && state.audio_paths.is_empty() {
            return Err(StepError::precondition_failed("no extracted audio"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if !ctx.settings.analysis.method.requires_audio() {
            return Ok(StepOutcome::Skipped(
                "brightness-aligned runs produce silent clips".to_string(),
            ));
        }

        let lags = state
            .lags
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("lags not estimated"))?;
        let window = state
            .window
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("window not resolved"))?;
        let duration = window.common_window_secs;

        ctx.pool.install(|| {
            state
                .trimmed
                .par_iter()
                .map(|(camera, video)| {
                    let wav = state.audio_path(camera).ok_or_else(|| {
                        MediaError::NoAudioTrack {
                            camera: camera.clone(),
                        }
                    })?;
                    let lag = lags.get(camera).unwrap_or(0.0);

                    let trimmed_wav = ctx.trimmed_audio_dir.join(format!("{camera}.wav"));
                    trim_audio_file(wav, lag, duration, &trimmed_wav)?;

                    // Mux into a sibling, then swap it over the silent clip.
                    let muxed = video.with_extension("audio.mp4");
                    attach_audio(video, &trimmed_wav, &muxed)?;
                    fs::rename(&muxed, video)?;

                    info!("{}: reattached {:.3}s of audio", camera, duration);
                    Ok::<_, MediaError>(())
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        for (camera, path) in &state.trimmed {
            if !path.is_file() {
                return Err(StepError::invalid_output(format!(
                    "clip for '{camera}' missing after audio mux: {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_step_has_correct_name() {
        assert_eq!(AttachAudioStep::new().name(), "AttachAudio");
    }
}
