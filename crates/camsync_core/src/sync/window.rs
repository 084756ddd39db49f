//! Common-window resolution and frame mapping.
//!
//! Once every camera has a normalized lag, the overlap shared by all of
//! them is the minimum of each camera's remaining footage. That window,
//! together with the uniform frame rate, maps deterministically to an
//! integer frame range per camera.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CameraRecording, FrameRange, NormalizedLagMap};

use super::{SyncError, SyncResult};

/// Resolved synchronization window and per-camera frame ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncWindow {
    /// Longest duration all cameras can supply simultaneously, seconds.
    pub common_window_secs: f64,
    /// The uniform frame rate shared by every camera.
    pub fps: f64,
    /// Frames in every output clip (`floor(common_window * fps)`).
    pub frame_count: u64,
    /// Per-camera frame ranges, keyed by camera name.
    ranges: BTreeMap<String, FrameRange>,
}

impl SyncWindow {
    /// Frame range for one camera.
    pub fn range_for(&self, camera: &str) -> Option<FrameRange> {
        self.ranges.get(camera).copied()
    }

    /// Iterate over `(camera, range)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FrameRange)> {
        self.ranges.iter().map(|(name, &range)| (name.as_str(), range))
    }
}

/// Resolve the common window across all cameras and map it to frames.
///
/// Preconditions, both fatal when violated:
/// - every camera has a normalized lag;
/// - all cameras share one frame rate (enforced after normalization).
///
/// The common window must be strictly positive; otherwise the recordings
/// have no shared overlap (or lag estimation failed) and synchronization
/// is infeasible for this input set.
pub fn resolve(
    recordings: &[CameraRecording],
    lags: &NormalizedLagMap,
) -> SyncResult<SyncWindow> {
    if recordings.is_empty() {
        return Err(SyncError::NoCameras);
    }

    let fps = uniform_fps(recordings)?;

    let mut availability = Vec::with_capacity(recordings.len());
    for recording in recordings {
        let lag = lags
            .get(&recording.name)
            .ok_or_else(|| SyncError::MissingLag {
                camera: recording.name.clone(),
            })?;
        availability.push((recording.name.clone(), recording.available_after(lag)));
    }

    let common_window_secs = availability
        .iter()
        .map(|(_, available)| *available)
        .fold(f64::INFINITY, f64::min);

    if common_window_secs <= 0.0 {
        return Err(SyncError::NoOverlap {
            common_window_secs,
            availability,
        });
    }

    let ranges: BTreeMap<String, FrameRange> = recordings
        .iter()
        .map(|recording| {
            // Lag presence was checked above.
            let lag = lags.get(&recording.name).unwrap_or(0.0);
            (
                recording.name.clone(),
                frame_range(lag, fps, common_window_secs),
            )
        })
        .collect();

    let frame_count = (common_window_secs * fps) as u64;

    tracing::info!(
        "Common window: {:.3}s ({} frames at {:.3} fps)",
        common_window_secs,
        frame_count,
        fps
    );

    Ok(SyncWindow {
        common_window_secs,
        fps,
        frame_count,
        ranges,
    })
}

/// Map a camera's lag and the common window onto a frame range.
///
/// `start = floor(lag * fps)`, `count = floor(common_window * fps)`;
/// the count is identical for every camera by construction.
pub fn frame_range(lag_secs: f64, fps: f64, common_window_secs: f64) -> FrameRange {
    FrameRange::new((lag_secs * fps) as u64, (common_window_secs * fps) as u64)
}

/// The single frame rate shared by all recordings.
fn uniform_fps(recordings: &[CameraRecording]) -> SyncResult<f64> {
    let fps = recordings[0].fps;
    if recordings.iter().any(|r| r.fps.to_bits() != fps.to_bits()) {
        return Err(SyncError::NonUniformFps {
            fps_values: recordings.iter().map(|r| r.fps).collect(),
        });
    }
    Ok(fps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LagMap, Rotation};
    use crate::sync::lags::normalize;

    fn recording(name: &str, duration_secs: f64, fps: f64) -> CameraRecording {
        CameraRecording {
            name: name.to_string(),
            path: format!("{}.mp4", name).into(),
            duration_secs,
            fps,
            sample_rate: Some(48000),
            width: 1920,
            height: 1080,
            rotation: Rotation::NotRotated,
        }
    }

    fn normalized(entries: &[(&str, f64)]) -> NormalizedLagMap {
        let raw: LagMap = entries
            .iter()
            .map(|(name, lag)| (name.to_string(), -*lag))
            .collect();
        // Negated values normalize back to the entries given.
        normalize(&raw).unwrap()
    }

    #[test]
    fn window_is_bound_by_tightest_camera() {
        let recordings = vec![
            recording("a", 10.0, 30.0),
            recording("b", 9.5, 30.0),
            recording("c", 11.0, 30.0),
        ];
        let lags = normalized(&[("a", 0.5), ("b", 0.0), ("c", 0.3)]);

        let window = resolve(&recordings, &lags).unwrap();

        // available: a=9.5, b=9.5, c=10.7 -> common 9.5.
        assert!((window.common_window_secs - 9.5).abs() < 1e-9);

        // Every camera can supply at least the window; at least one is
        // exactly at the bound.
        let mut at_bound = 0;
        for rec in &recordings {
            let available = rec.available_after(lags.get(&rec.name).unwrap());
            assert!(available >= window.common_window_secs - 1e-9);
            if (available - window.common_window_secs).abs() < 1e-9 {
                at_bound += 1;
            }
        }
        assert!(at_bound >= 1);
    }

    #[test]
    fn frame_count_is_identical_across_cameras() {
        let recordings = vec![
            recording("a", 10.0, 30.0),
            recording("b", 9.5, 30.0),
            recording("c", 11.0, 30.0),
        ];
        let lags = normalized(&[("a", 0.5), ("b", 0.0), ("c", 0.3)]);

        let window = resolve(&recordings, &lags).unwrap();
        assert_eq!(window.frame_count, (9.5f64 * 30.0) as u64);

        for (_, range) in window.iter() {
            assert_eq!(range.frame_count, window.frame_count);
        }
    }

    #[test]
    fn start_frames_floor_lag_times_fps() {
        let recordings = vec![recording("a", 10.0, 30.0), recording("b", 10.0, 30.0)];
        let lags = normalized(&[("a", 0.55), ("b", 0.0)]);

        let window = resolve(&recordings, &lags).unwrap();
        // floor(0.55 * 30) = floor(16.5) = 16.
        assert_eq!(window.range_for("a").unwrap().start_frame, 16);
        assert_eq!(window.range_for("b").unwrap().start_frame, 0);
    }

    #[test]
    fn non_positive_window_is_fatal() {
        let recordings = vec![recording("a", 2.0, 30.0), recording("b", 10.0, 30.0)];
        let lags = normalized(&[("a", 3.0), ("b", 0.0)]);

        let err = resolve(&recordings, &lags).unwrap_err();
        match err {
            SyncError::NoOverlap {
                common_window_secs,
                availability,
            } => {
                assert!(common_window_secs <= 0.0);
                assert!(availability.iter().any(|(name, _)| name == "a"));
            }
            other => panic!("expected NoOverlap, got {:?}", other),
        }
    }

    #[test]
    fn mixed_fps_is_fatal() {
        let recordings = vec![recording("a", 10.0, 30.0), recording("b", 10.0, 29.97)];
        let lags = normalized(&[("a", 0.0), ("b", 0.0)]);

        assert!(matches!(
            resolve(&recordings, &lags),
            Err(SyncError::NonUniformFps { .. })
        ));
    }

    #[test]
    fn missing_lag_is_fatal() {
        let recordings = vec![recording("a", 10.0, 30.0), recording("b", 10.0, 30.0)];
        let lags = normalized(&[("a", 0.0)]);

        assert!(matches!(
            resolve(&recordings, &lags),
            Err(SyncError::MissingLag { camera }) if camera == "b"
        ));
    }

    #[test]
    fn three_camera_scenario_end_to_end() {
        // Known injected lags 0s/0.5s/0.2s at 30 fps; cam_b started
        // latest so it normalizes to zero.
        let recordings = vec![
            recording("cam_a", 10.0, 30.0),
            recording("cam_b", 9.5, 30.0),
            recording("cam_c", 11.0, 30.0),
        ];
        let raw: LagMap = [("cam_a", 0.0), ("cam_b", 0.5), ("cam_c", 0.2)]
            .iter()
            .map(|(name, lag)| (name.to_string(), *lag))
            .collect();

        let lags = normalize(&raw).unwrap();
        assert_eq!(lags.get("cam_b"), Some(0.0));
        assert_eq!(lags.get("cam_a"), Some(0.5));
        assert!((lags.get("cam_c").unwrap() - 0.3).abs() < 1e-12);

        let window = resolve(&recordings, &lags).unwrap();
        // available: cam_a 9.5, cam_b 9.5, cam_c ~10.7.
        assert!((window.common_window_secs - 9.5).abs() < 1e-9);
        assert_eq!(window.frame_count, 285);
    }
}
