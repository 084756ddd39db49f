//! Audio extraction and waveform loading via ffmpeg.
//!
//! Each camera's track is extracted to a standalone WAV (kept for later
//! reattachment), then loaded as mono f64 samples at its native rate
//! through an ffmpeg raw-float pipe.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::analysis::AudioSignal;
use crate::models::CameraRecording;

use super::tools::{run_tool, FFMPEG};
use super::{MediaError, MediaResult};

/// Extract a camera's audio track to `<audio_dir>/<camera>.wav`.
///
/// A camera without audio is a hard stop: alignment needs a signal.
pub fn extract_audio_file(recording: &CameraRecording, audio_dir: &Path) -> MediaResult<PathBuf> {
    let output_path = audio_dir.join(format!("{}.wav", recording.name));

    run_tool(
        FFMPEG,
        Command::new(FFMPEG)
            .arg("-y")
            .arg("-i")
            .arg(&recording.path)
            .arg("-vn")
            .arg(&output_path),
    )
    .map_err(|e| match e {
        // ffmpeg errors out when the input has no audio stream at all.
        MediaError::CommandFailed { .. } => MediaError::NoAudioTrack {
            camera: recording.name.clone(),
        },
        other => other,
    })?;

    let is_empty = fs::metadata(&output_path).map(|m| m.len() == 0).unwrap_or(true);
    if is_empty {
        return Err(MediaError::NoAudioTrack {
            camera: recording.name.clone(),
        });
    }

    Ok(output_path)
}

/// Load a waveform as mono f64 samples at the given sample rate.
///
/// Decodes through an ffmpeg `f64le` pipe, downmixing to one channel.
pub fn load_waveform(path: &Path, sample_rate: u32) -> MediaResult<AudioSignal> {
    if !path.exists() {
        return Err(MediaError::SourceNotFound(path.to_path_buf()));
    }

    let stdout = run_tool(
        FFMPEG,
        Command::new(FFMPEG)
            .arg("-i")
            .arg(path)
            .arg("-ac")
            .arg("1")
            .arg("-ar")
            .arg(sample_rate.to_string())
            .arg("-f")
            .arg("f64le")
            .arg("-acodec")
            .arg("pcm_f64le")
            .arg("pipe:1"),
    )?;

    let samples = bytes_to_f64_samples(&stdout);
    if samples.is_empty() {
        return Err(MediaError::NoAudioTrack {
            camera: super::probe::camera_name(path),
        });
    }

    tracing::debug!(
        "Loaded {} samples ({:.2}s) from {}",
        samples.len(),
        samples.len() as f64 / sample_rate as f64,
        path.display()
    );

    Ok(AudioSignal::new(samples, sample_rate))
}

/// Cut a WAV down to `[start_secs, start_secs + duration_secs)`.
pub fn trim_audio_file(
    input: &Path,
    start_secs: f64,
    duration_secs: f64,
    output: &Path,
) -> MediaResult<()> {
    run_tool(
        FFMPEG,
        Command::new(FFMPEG)
            .arg("-i")
            .arg(input)
            .arg("-ss")
            .arg(format!("{}", start_secs))
            .arg("-t")
            .arg(format!("{}", duration_secs))
            .arg("-y")
            .arg(output),
    )?;
    Ok(())
}

/// Interpret raw little-endian f64 bytes as samples. Trailing partial
/// values are dropped.
fn bytes_to_f64_samples(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        })
        .collect()
}
