//! Media metadata probing via ffprobe.
//!
//! A single `ffprobe -print_format json` call supplies duration, frame
//! rate, audio sample rate, dimensions, and rotation side data. Frame
//! rates come back as rational `num/den` strings and are parsed
//! structurally; malformed output is a typed parse failure.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

use crate::models::{CameraRecording, Rotation, RotationAngle};

use super::tools::{run_tool, FFPROBE};
use super::{MediaError, MediaResult};

/// Probe a video file into a `CameraRecording`.
///
/// The camera name is the filename stem. Duration and fps are immutable
/// once probed; callers re-probe regenerated files instead of mutating.
pub fn probe_recording(path: &Path) -> MediaResult<CameraRecording> {
    if !path.exists() {
        return Err(MediaError::SourceNotFound(path.to_path_buf()));
    }

    let name = camera_name(path);

    let stdout = run_tool(
        FFPROBE,
        Command::new(FFPROBE)
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(path),
    )?;

    let json: Value = serde_json::from_slice(&stdout)
        .map_err(|e| MediaError::parse("ffprobe output", e.to_string()))?;

    parse_probe_json(&json, path, name)
}

/// Count the actual frames in a video by decoding it.
///
/// Used by the post-trim verification that every output is the same
/// length. Slower than reading container metadata but exact.
pub fn count_frames(path: &Path) -> MediaResult<u64> {
    let stdout = run_tool(
        FFPROBE,
        Command::new(FFPROBE)
            .arg("-v")
            .arg("error")
            .arg("-count_frames")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg("stream=nb_read_frames")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(path),
    )?;

    let text = String::from_utf8_lossy(&stdout);
    text.trim()
        .parse::<u64>()
        .map_err(|e| MediaError::parse("frame count", format!("{}: {:?}", e, text.trim())))
}

/// Derive the stable camera key from a file path (the filename stem).
pub fn camera_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_probe_json(json: &Value, path: &Path, name: String) -> MediaResult<CameraRecording> {
    let duration_str = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .ok_or_else(|| MediaError::parse("duration", "missing format.duration"))?;
    let duration_secs: f64 = duration_str
        .parse()
        .map_err(|e| MediaError::parse("duration", format!("{}: {:?}", e, duration_str)))?;

    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .ok_or_else(|| MediaError::parse("streams", "missing streams array"))?;

    let video = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("video"))
        .ok_or_else(|| MediaError::parse("streams", "no video stream"))?;

    let rate_str = video
        .get("r_frame_rate")
        .and_then(|r| r.as_str())
        .ok_or_else(|| MediaError::parse("frame rate", "missing r_frame_rate"))?;
    let fps = parse_rational(rate_str)?;

    let width = video.get("width").and_then(|w| w.as_u64()).unwrap_or(0) as u32;
    let height = video.get("height").and_then(|h| h.as_u64()).unwrap_or(0) as u32;

    let rotation = detect_rotation(video);

    let sample_rate = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("audio"))
        .and_then(|s| s.get("sample_rate"))
        .and_then(|r| r.as_str())
        .and_then(|r| r.parse::<u32>().ok());

    tracing::debug!(
        "Probed {}: {:.3}s @ {:.3} fps, audio {:?} Hz, rotation {:?}",
        name,
        duration_secs,
        fps,
        sample_rate,
        rotation
    );

    Ok(CameraRecording {
        name,
        path: path.to_path_buf(),
        duration_secs,
        fps,
        sample_rate,
        width,
        height,
        rotation,
    })
}

/// Parse a frame rate in `numerator/denominator` or decimal form.
pub fn parse_rational(text: &str) -> MediaResult<f64> {
    let text = text.trim();

    if let Some((num_str, den_str)) = text.split_once('/') {
        let numerator: i64 = num_str
            .trim()
            .parse()
            .map_err(|e| MediaError::parse("frame rate", format!("{}: {:?}", e, text)))?;
        let denominator: i64 = den_str
            .trim()
            .parse()
            .map_err(|e| MediaError::parse("frame rate", format!("{}: {:?}", e, text)))?;

        if denominator == 0 {
            return Err(MediaError::parse("frame rate", format!("zero denominator: {:?}", text)));
        }

        Ok(numerator as f64 / denominator as f64)
    } else {
        text.parse::<f64>()
            .map_err(|e| MediaError::parse("frame rate", format!("{}: {:?}", e, text)))
    }
}

/// Detect the rotation state of a video stream.
///
/// Container-declared rotation comes from display-matrix side data (or the
/// legacy `rotate` tag). Separately, some vertical videos report landscape
/// dimensions plus rotation metadata that decoders disagree on; those are
/// flagged by comparing the coded dimensions against the display
/// dimensions - inequality in both axes at once marks the file as having
/// reversed metadata. That both-axes condition is tuned for quarter-turn
/// rotations and is ambiguous for 180 degrees.
fn detect_rotation(video: &Value) -> Rotation {
    let width = video.get("width").and_then(|w| w.as_u64());
    let height = video.get("height").and_then(|h| h.as_u64());
    let coded_width = video.get("coded_width").and_then(|w| w.as_u64());
    let coded_height = video.get("coded_height").and_then(|h| h.as_u64());

    if let (Some(w), Some(h), Some(cw), Some(ch)) = (width, height, coded_width, coded_height) {
        if w != cw && h != ch {
            return Rotation::ReversedMetadata;
        }
    }

    let side_data_rotation = video
        .get("side_data_list")
        .and_then(|list| list.as_array())
        .and_then(|list| {
            list.iter()
                .find_map(|entry| entry.get("rotation").and_then(|r| r.as_i64()))
        });

    let tag_rotation = video
        .get("tags")
        .and_then(|tags| tags.get("rotate"))
        .and_then(|r| r.as_str())
        .and_then(|r| r.parse::<i64>().ok());

    match side_data_rotation.or(tag_rotation).and_then(RotationAngle::from_degrees) {
        Some(angle) => Rotation::Rotated(angle),
        None => Rotation::NotRotated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rational_parses_fraction_form() {
        assert!((parse_rational("30000/1001").unwrap() - 29.97002997).abs() < 1e-6);
        assert!((parse_rational("25/1").unwrap() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rational_parses_decimal_form() {
        assert!((parse_rational("29.97").unwrap() - 29.97).abs() < f64::EPSILON);
    }

    #[test]
    fn rational_rejects_malformed_input() {
        assert!(matches!(
            parse_rational("garbage"),
            Err(MediaError::Parse { .. })
        ));
        assert!(matches!(
            parse_rational("30/0"),
            Err(MediaError::Parse { .. })
        ));
        assert!(matches!(parse_rational("a/b"), Err(MediaError::Parse { .. })));
    }

    #[test]
    fn camera_name_is_filename_stem() {
        assert_eq!(camera_name(Path::new("/videos/raw_cam1.MP4")), "raw_cam1");
    }

    #[test]
    fn rotation_from_side_data() {
        let video = json!({
            "width": 1920, "height": 1080,
            "coded_width": 1920, "coded_height": 1080,
            "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}]
        });
        assert_eq!(
            detect_rotation(&video),
            Rotation::Rotated(RotationAngle::Deg270)
        );
    }

    #[test]
    fn rotation_from_legacy_tag() {
        let video = json!({
            "width": 1080, "height": 1920,
            "coded_width": 1080, "coded_height": 1920,
            "tags": {"rotate": "180"}
        });
        assert_eq!(
            detect_rotation(&video),
            Rotation::Rotated(RotationAngle::Deg180)
        );
    }

    #[test]
    fn disagreeing_dimensions_flag_reversed_metadata() {
        let video = json!({
            "width": 1080, "height": 1920,
            "coded_width": 1920, "coded_height": 1080
        });
        assert_eq!(detect_rotation(&video), Rotation::ReversedMetadata);
    }

    #[test]
    fn matching_dimensions_without_metadata_are_not_rotated() {
        let video = json!({
            "width": 1920, "height": 1080,
            "coded_width": 1920, "coded_height": 1080
        });
        assert_eq!(detect_rotation(&video), Rotation::NotRotated);
    }

    #[test]
    fn parse_probe_json_extracts_recording() {
        let json = json!({
            "format": {"duration": "10.500000"},
            "streams": [
                {
                    "codec_type": "video",
                    "r_frame_rate": "30/1",
                    "width": 1280, "height": 720,
                    "coded_width": 1280, "coded_height": 720
                },
                {"codec_type": "audio", "sample_rate": "48000"}
            ]
        });

        let rec = parse_probe_json(&json, Path::new("/tmp/cam_a.mp4"), "cam_a".into()).unwrap();
        assert_eq!(rec.name, "cam_a");
        assert!((rec.duration_secs - 10.5).abs() < f64::EPSILON);
        assert!((rec.fps - 30.0).abs() < f64::EPSILON);
        assert_eq!(rec.sample_rate, Some(48000));
        assert_eq!((rec.width, rec.height), (1280, 720));
    }

    #[test]
    fn parse_probe_json_handles_missing_audio() {
        let json = json!({
            "format": {"duration": "3.0"},
            "streams": [
                {"codec_type": "video", "r_frame_rate": "24/1", "width": 640, "height": 480,
                 "coded_width": 640, "coded_height": 480}
            ]
        });

        let rec = parse_probe_json(&json, Path::new("cam.mp4"), "cam".into()).unwrap();
        assert_eq!(rec.sample_rate, None);
        assert!(!rec.has_audio());
    }
}
