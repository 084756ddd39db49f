//! Signal extraction step - decodes the per-camera alignment signal.
//!
//! For audio alignment, each camera's track is extracted to a WAV (kept
//! for reattachment) and decoded as mono f64 samples at one shared
//! rate. For brightness alignment, each camera's frames are decoded to
//! a per-frame mean intensity series instead.

use rayon::prelude::*;
use tracing::info;

use crate::analysis::brightness::brightness_by_frame;
use crate::debug::AudioMeta;
use crate::media::audio::{extract_audio_file, load_waveform};
use crate::media::MediaError;
use crate::models::AlignmentMethod;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct ExtractSignalsStep;

impl ExtractSignalsStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractSignalsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExtractSignalsStep {
    fn name(&self) -> &str {
        "ExtractSignals"
    }

    fn description(&self) -> &str {
        "Decode per-camera audio or brightness signals"
    }

    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.recordings.is_empty() {
            return Err(StepError::precondition_failed("recordings not probed"));
        }
        if ctx.settings.analysis.method.requires_audio() {
            // Every camera needs a track; failing early beats failing
            // halfway through extraction.
            for recording in &state.recordings {
                if !recording.has_audio() {
                    return Err(MediaError::NoAudioTrack {
                        camera: recording.name.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        match ctx.settings.analysis.method {
            AlignmentMethod::AudioCrossCorrelation => {
                let sample_rate = state
                    .recordings
                    .iter()
                    .filter_map(|r| r.sample_rate)
                    .min()
                    .unwrap_or(ctx.settings.analysis.fallback_sample_rate);
                info!("Decoding audio for {} camera(s) at {} Hz", state.recordings.len(), sample_rate);

                let decoded = ctx.pool.install(|| {
                    state
                        .recordings
                        .par_iter()
                        .map(|recording| {
                            let wav = extract_audio_file(recording, &ctx.audio_dir)?;
                            let signal = load_waveform(&wav, sample_rate)?;
                            Ok::<_, MediaError>((recording.name.clone(), wav, signal))
                        })
                        .collect::<Result<Vec<_>, _>>()
                })?;

                for (name, wav, signal) in decoded {
                    state.report.add_audio(
                        name.clone(),
                        AudioMeta {
                            sample_rate: signal.sample_rate,
                            duration_secs: signal.duration_secs(),
                        },
                    );
                    state.audio_paths.push((name.clone(), wav));
                    state.signals.push((name, signal));
                }
            }
            AlignmentMethod::BrightnessChange => {
                info!(
                    "Decoding brightness series for {} camera(s)",
                    state.recordings.len()
                );

                let series = ctx.pool.install(|| {
                    state
                        .recordings
                        .par_iter()
                        .map(|recording| {
                            let values = brightness_by_frame(recording)?;
                            Ok::<_, crate::analysis::AnalysisError>((
                                recording.name.clone(),
                                values,
                                recording.fps,
                            ))
                        })
                        .collect::<Result<Vec<_>, _>>()
                })?;

                state.brightness = series;
            }
        }

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        let expected = state.recordings.len();
        let produced = if ctx.settings.analysis.method.requires_audio() {
            state.signals.len()
        } else {
            state.brightness.len()
        };
        if produced != expected {
            return Err(StepError::invalid_output(format!(
                "decoded {produced} signal(s) for {expected} camera(s)"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_step_has_correct_name() {
        assert_eq!(ExtractSignalsStep::new().name(), "ExtractSignals");
    }
}
