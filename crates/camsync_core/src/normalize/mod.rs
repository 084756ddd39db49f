//! Framerate and samplerate normalization.
//!
//! Trimming math assumes a single fps and a single audio sample rate
//! across the whole camera set. When cameras disagree, every input is
//! re-encoded to the minimum common fps and minimum common sample rate
//! before alignment proceeds, and the regenerated files are re-probed.
//! The raw source files are never touched.

use std::path::Path;
use std::process::Command;

use crate::media::probe::probe_recording;
use crate::media::tools::{run_tool, FFMPEG};
use crate::media::MediaResult;
use crate::models::CameraRecording;

/// Whether all recordings already agree on fps and sample rate.
pub fn rates_are_uniform(recordings: &[CameraRecording]) -> bool {
    distinct_fps(recordings).len() <= 1 && distinct_sample_rates(recordings).len() <= 1
}

/// Re-encode every recording to the minimum common fps and sample rate.
///
/// Returns a fresh set of `CameraRecording`s probed from the regenerated
/// files. Any single re-encode failure aborts: partial normalization is
/// not a valid state.
pub fn normalize_recordings(
    recordings: &[CameraRecording],
    output_dir: &Path,
    fallback_sample_rate: u32,
) -> MediaResult<Vec<CameraRecording>> {
    let desired_fps = recordings
        .iter()
        .map(|r| r.fps)
        .fold(f64::INFINITY, f64::min);

    let desired_sample_rate = recordings
        .iter()
        .filter_map(|r| r.sample_rate)
        .min()
        .unwrap_or(fallback_sample_rate);

    tracing::info!(
        "Normalizing {} cameras to {:.3} fps / {} Hz",
        recordings.len(),
        desired_fps,
        desired_sample_rate
    );

    let mut normalized = Vec::with_capacity(recordings.len());
    for recording in recordings {
        let output_path = output_dir.join(format!("{}.mp4", recording.name));

        run_tool(
            FFMPEG,
            Command::new(FFMPEG)
                .arg("-i")
                .arg(&recording.path)
                .arg("-r")
                .arg(format!("{}", desired_fps))
                .arg("-ar")
                .arg(desired_sample_rate.to_string())
                .arg("-y")
                .arg(&output_path),
        )?;

        normalized.push(probe_recording(&output_path)?);
    }

    Ok(normalized)
}

fn distinct_fps(recordings: &[CameraRecording]) -> Vec<f64> {
    let mut seen: Vec<u64> = Vec::new();
    for recording in recordings {
        let bits = recording.fps.to_bits();
        if !seen.contains(&bits) {
            seen.push(bits);
        }
    }
    seen.into_iter().map(f64::from_bits).collect()
}

fn distinct_sample_rates(recordings: &[CameraRecording]) -> Vec<u32> {
    let mut seen = Vec::new();
    for recording in recordings {
        if let Some(rate) = recording.sample_rate {
            if !seen.contains(&rate) {
                seen.push(rate);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rotation;

    fn recording(name: &str, fps: f64, sample_rate: Option<u32>) -> CameraRecording {
        CameraRecording {
            name: name.to_string(),
            path: format!("{}.mp4", name).into(),
            duration_secs: 10.0,
            fps,
            sample_rate,
            width: 1920,
            height: 1080,
            rotation: Rotation::NotRotated,
        }
    }

    #[test]
    fn uniform_rates_need_no_normalization() {
        let recordings = vec![
            recording("a", 30.0, Some(48000)),
            recording("b", 30.0, Some(48000)),
        ];
        assert!(rates_are_uniform(&recordings));
    }

    #[test]
    fn mixed_fps_triggers_normalization() {
        let recordings = vec![
            recording("a", 30.0, Some(48000)),
            recording("b", 29.97, Some(48000)),
        ];
        assert!(!rates_are_uniform(&recordings));
    }

    #[test]
    fn mixed_sample_rates_trigger_normalization() {
        let recordings = vec![
            recording("a", 30.0, Some(48000)),
            recording("b", 30.0, Some(44100)),
        ];
        assert!(!rates_are_uniform(&recordings));
    }

    #[test]
    fn missing_audio_does_not_count_as_distinct_rate() {
        let recordings = vec![
            recording("a", 30.0, Some(48000)),
            recording("b", 30.0, None),
        ];
        assert!(rates_are_uniform(&recordings));
    }

    #[test]
    fn distinct_fps_deduplicates() {
        let recordings = vec![
            recording("a", 29.97, Some(48000)),
            recording("b", 29.97, Some(48000)),
            recording("c", 30.0, Some(48000)),
        ];
        assert_eq!(distinct_fps(&recordings).len(), 2);
    }
}
