//! Camera recording metadata and frame-range types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One physical input video, identified by its filename stem.
///
/// Duration and fps are probed once and immutable afterwards; no clock
/// drift within a recording is modeled. Framerate normalization does not
/// mutate a recording - it produces a new `CameraRecording` pointing at
/// the regenerated file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRecording {
    /// Stable camera key, derived from the filename stem.
    pub name: String,
    /// Source file path.
    pub path: PathBuf,
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// Frame rate, derived from the stream's rational frame rate.
    pub fps: f64,
    /// Audio sample rate in Hz; `None` when the file has no audio track.
    pub sample_rate: Option<u32>,
    /// Display width in pixels.
    pub width: u32,
    /// Display height in pixels.
    pub height: u32,
    /// Rotation state detected during probing.
    pub rotation: Rotation,
}

impl CameraRecording {
    /// Footage remaining once the leading `lag_secs` seconds are cut off.
    pub fn available_after(&self, lag_secs: f64) -> f64 {
        self.duration_secs - lag_secs
    }

    /// Whether this recording carries an audio track.
    pub fn has_audio(&self) -> bool {
        self.sample_rate.is_some()
    }
}

/// Rotation state of a recording.
///
/// `ReversedMetadata` marks the case where the container-level rotation
/// metadata disagrees with the pixel-level orientation (two probe sources
/// report different dimensions in both axes). Such files need a
/// compensating transpose during frame-accurate trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation metadata.
    #[default]
    NotRotated,
    /// Container declares a rotation angle.
    Rotated(RotationAngle),
    /// Container metadata and pixel data disagree about orientation.
    ReversedMetadata,
}

impl Rotation {
    /// FFmpeg video filter compensating for this rotation, if any.
    ///
    /// Reversed-metadata sources are handled like a 90-degree rotation,
    /// matching how they present when decoded with auto-rotation disabled.
    pub fn transpose_filter(&self) -> Option<&'static str> {
        match self {
            Rotation::NotRotated => None,
            Rotation::Rotated(angle) => Some(angle.transpose_filter()),
            Rotation::ReversedMetadata => Some("transpose=1"),
        }
    }

    /// Whether the compensating filter swaps the frame dimensions.
    pub fn swaps_dimensions(&self) -> bool {
        !matches!(
            self,
            Rotation::NotRotated | Rotation::Rotated(RotationAngle::Deg180)
        )
    }
}

/// A container-declared rotation angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationAngle {
    Deg90,
    Deg180,
    Deg270,
}

impl RotationAngle {
    /// Normalize an ffprobe rotation value (degrees, possibly negative)
    /// to an angle. Returns `None` for 0 or unrecognized values.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            90 => Some(RotationAngle::Deg90),
            180 => Some(RotationAngle::Deg180),
            270 => Some(RotationAngle::Deg270),
            _ => None,
        }
    }

    /// FFmpeg transpose filter undoing this rotation.
    ///
    /// 90 degrees needs a counterclockwise rotation, 270 a clockwise one,
    /// and 180 a double rotation.
    pub fn transpose_filter(&self) -> &'static str {
        match self {
            RotationAngle::Deg90 => "transpose=2",
            RotationAngle::Deg270 => "transpose=1",
            RotationAngle::Deg180 => "transpose=1,transpose=1",
        }
    }
}

/// Half-open range of frame indices `[start_frame, start_frame + frame_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    /// First frame to retain.
    pub start_frame: u64,
    /// Number of frames to retain.
    pub frame_count: u64,
}

impl FrameRange {
    /// Create a new frame range.
    pub fn new(start_frame: u64, frame_count: u64) -> Self {
        Self {
            start_frame,
            frame_count,
        }
    }

    /// One-past-the-last frame index.
    pub fn end_frame(&self) -> u64 {
        self.start_frame + self.frame_count
    }

    /// Whether the given frame index falls inside the range.
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.start_frame && frame < self.end_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_range_is_half_open() {
        let range = FrameRange::new(10, 5);
        assert!(!range.contains(9));
        assert!(range.contains(10));
        assert!(range.contains(14));
        assert!(!range.contains(15));
        assert_eq!(range.end_frame(), 15);
    }

    #[test]
    fn rotation_angle_normalizes_negative_degrees() {
        assert_eq!(RotationAngle::from_degrees(-90), Some(RotationAngle::Deg270));
        assert_eq!(RotationAngle::from_degrees(270), Some(RotationAngle::Deg270));
        assert_eq!(RotationAngle::from_degrees(0), None);
        assert_eq!(RotationAngle::from_degrees(45), None);
    }

    #[test]
    fn rotation_filter_table() {
        assert_eq!(
            Rotation::Rotated(RotationAngle::Deg90).transpose_filter(),
            Some("transpose=2")
        );
        assert_eq!(
            Rotation::Rotated(RotationAngle::Deg270).transpose_filter(),
            Some("transpose=1")
        );
        assert_eq!(
            Rotation::Rotated(RotationAngle::Deg180).transpose_filter(),
            Some("transpose=1,transpose=1")
        );
        assert_eq!(Rotation::NotRotated.transpose_filter(), None);
        assert_eq!(
            Rotation::ReversedMetadata.transpose_filter(),
            Some("transpose=1")
        );
    }

    #[test]
    fn dimension_swap_tracks_quarter_turns() {
        assert!(Rotation::Rotated(RotationAngle::Deg90).swaps_dimensions());
        assert!(Rotation::ReversedMetadata.swaps_dimensions());
        assert!(!Rotation::Rotated(RotationAngle::Deg180).swaps_dimensions());
        assert!(!Rotation::NotRotated.swaps_dimensions());
    }

    #[test]
    fn available_footage_subtracts_lag() {
        let rec = CameraRecording {
            name: "cam_a".into(),
            path: PathBuf::from("cam_a.mp4"),
            duration_secs: 10.0,
            fps: 30.0,
            sample_rate: Some(48000),
            width: 1920,
            height: 1080,
            rotation: Rotation::NotRotated,
        };
        assert!((rec.available_after(2.5) - 7.5).abs() < f64::EPSILON);
        assert!(rec.has_audio());
    }
}
