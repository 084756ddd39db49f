//! Brightness-change lag detection.
//!
//! When audio is unavailable or unreliable, a deliberate light event
//! (e.g. a clapperboard flash) serves as the sync marker. Every frame is
//! decoded to grayscale, the mean pixel intensity forms a per-frame
//! series, and the first frame where brightness both jumps and
//! accelerates past a threshold is the marker.
//!
//! Decoding every frame makes this the most expensive step in the
//! pipeline; the whole series must be materialized before detection
//! because the second difference needs it.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::media::tools::FFMPEG;
use crate::media::{MediaError, MediaResult};
use crate::models::CameraRecording;

use super::types::{AnalysisError, AnalysisResult};

/// Suffix for persisted brightness series files.
pub const BRIGHTNESS_SUFFIX: &str = "_brightness";

/// Find the frame index of the first significant brightness change.
///
/// Builds the first difference `d` (prepend convention, `d[0] = 0`), the
/// second difference `dd`, and the combined metric `m = d * dd` - large
/// when brightness is both increasing and accelerating. Returns the
/// first index where `m` reaches the threshold. When no index qualifies,
/// falls back to the frame with the fastest brightness acceleration so
/// the method always yields a lag.
pub fn first_brightness_change(series: &[f64], threshold: f64) -> AnalysisResult<usize> {
    if series.is_empty() {
        return Err(AnalysisError::InvalidSignal(
            "empty brightness series".to_string(),
        ));
    }

    let diff = prepend_diff(series);
    let double_diff = prepend_diff(&diff);

    let combined: Vec<f64> = diff
        .iter()
        .zip(double_diff.iter())
        .map(|(d, dd)| d * dd)
        .collect();

    match combined.iter().position(|&m| m >= threshold) {
        Some(index) => {
            tracing::info!("First brightness change detected at frame {}", index);
            Ok(index)
        }
        None => {
            let fallback = argmax_first(&double_diff);
            tracing::info!(
                "No brightness change exceeded threshold, defaulting to frame {} with fastest brightness change",
                fallback
            );
            Ok(fallback)
        }
    }
}

/// First difference with the first element prepended, so the output has
/// the same length as the input and starts at zero.
fn prepend_diff(series: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    let mut previous = series[0];
    for &value in series {
        out.push(value - previous);
        previous = value;
    }
    out
}

fn argmax_first(values: &[f64]) -> usize {
    let mut best_index = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best_value = v;
            best_index = i;
        }
    }
    best_index
}

/// Decode every frame of a recording and compute its mean intensity.
///
/// Streams grayscale raw frames from an ffmpeg pipe; one sample per
/// frame, indexed by frame number. The series is persisted next to the
/// source file for debugging and plotting.
pub fn brightness_by_frame(recording: &CameraRecording) -> AnalysisResult<Vec<f64>> {
    tracing::info!(
        "Detecting per-frame brightness in {}",
        recording.path.display()
    );

    let frame_bytes = recording.width as usize * recording.height as usize;
    if frame_bytes == 0 {
        return Err(AnalysisError::InvalidSignal(format!(
            "camera '{}' has zero-sized frames",
            recording.name
        )));
    }

    let mut child = Command::new(FFMPEG)
        .arg("-i")
        .arg(&recording.path)
        .arg("-f")
        .arg("rawvideo")
        .arg("-pix_fmt")
        .arg("gray")
        .arg("pipe:1")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaError::ToolNotFound {
                    tool: FFMPEG.to_string(),
                }
            } else {
                MediaError::Io(e)
            }
        })?;

    let mut stdout = child.stdout.take().ok_or_else(|| {
        MediaError::command_failed(FFMPEG, -1, "failed to capture decoder stdout")
    })?;

    let mut series = Vec::new();
    let mut frame = vec![0u8; frame_bytes];
    loop {
        match read_frame(&mut stdout, &mut frame) {
            FrameRead::Full => {
                let sum: u64 = frame.iter().map(|&p| p as u64).sum();
                series.push(sum as f64 / frame_bytes as f64);
            }
            FrameRead::Eof => break,
            FrameRead::Error(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AnalysisError::Media(MediaError::Io(e)));
            }
        }
    }

    let status = child.wait().map_err(MediaError::Io)?;
    if !status.success() {
        return Err(AnalysisError::Media(MediaError::command_failed(
            FFMPEG,
            status.code().unwrap_or(-1),
            "frame decode for brightness analysis failed",
        )));
    }

    if series.is_empty() {
        return Err(AnalysisError::InvalidSignal(format!(
            "no frames decoded from camera '{}'",
            recording.name
        )));
    }

    persist_series(&series, &series_path(&recording.path))?;

    Ok(series)
}

enum FrameRead {
    Full,
    Eof,
    Error(std::io::Error),
}

/// Read exactly one frame, tolerating a clean EOF at a frame boundary.
/// A partial trailing frame is discarded.
fn read_frame(reader: &mut impl Read, frame: &mut [u8]) -> FrameRead {
    let mut filled = 0;
    while filled < frame.len() {
        match reader.read(&mut frame[filled..]) {
            Ok(0) => return FrameRead::Eof,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return FrameRead::Error(e),
        }
    }
    FrameRead::Full
}

/// Where a recording's brightness series is persisted.
pub fn series_path(video_path: &Path) -> PathBuf {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    video_path.with_file_name(format!("{}{}.json", stem, BRIGHTNESS_SUFFIX))
}

/// Persist a brightness series as JSON for debugging/plotting.
fn persist_series(series: &[f64], path: &Path) -> MediaResult<()> {
    let json = serde_json::to_string(series)
        .map_err(|e| MediaError::parse("brightness series", e.to_string()))?;
    std::fs::write(path, json)?;
    tracing::debug!("Persisted brightness series to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_injected_discontinuity() {
        // Flat series with a sharp jump at index 50.
        let mut series = vec![10.0; 100];
        for value in series.iter_mut().skip(50) {
            *value = 200.0;
        }

        // d[50] = 190, dd[50] = 190, m[50] = 36100.
        let index = first_brightness_change(&series, 1000.0).unwrap();
        assert_eq!(index, 50);
    }

    #[test]
    fn falls_back_to_fastest_acceleration() {
        // Gentle ramp: no combined metric reaches the threshold, so the
        // detector falls back to the argmax of the second difference.
        let series: Vec<f64> = (0..100)
            .map(|i| if i < 60 { 10.0 } else { 10.0 + (i - 60) as f64 * 0.5 })
            .collect();

        let index = first_brightness_change(&series, 1000.0).unwrap();
        // dd peaks where the ramp begins.
        assert_eq!(index, 61);
    }

    #[test]
    fn first_qualifying_index_wins() {
        let mut series = vec![0.0; 100];
        for value in series.iter_mut().skip(30) {
            *value = 100.0;
        }
        for value in series.iter_mut().skip(70) {
            *value = 250.0;
        }

        // Both steps exceed the threshold; the earlier one is returned.
        let index = first_brightness_change(&series, 1000.0).unwrap();
        assert_eq!(index, 30);
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(first_brightness_change(&[], 1000.0).is_err());
    }

    #[test]
    fn prepend_diff_starts_at_zero() {
        let diff = prepend_diff(&[5.0, 7.0, 4.0]);
        assert_eq!(diff, vec![0.0, 2.0, -3.0]);
    }

    #[test]
    fn series_path_appends_suffix() {
        let path = series_path(Path::new("/videos/cam_a.mp4"));
        assert_eq!(path, Path::new("/videos/cam_a_brightness.json"));
    }
}
