//! Per-camera lag estimation and normalization.
//!
//! Raw lags are relative values: the audio method measures every camera
//! against a fixed reference (the first camera in order), the brightness
//! method against each camera's own timeline start. Normalization
//! rebases either kind onto a common zero where the latest-starting
//! camera needs no front trim.

use std::collections::BTreeMap;

use crate::analysis::correlation::cross_correlate;
use crate::analysis::{AnalysisError, AnalysisResult, AudioSignal};
use crate::models::{LagMap, NormalizedLagMap};

use super::{SyncError, SyncResult};

/// Estimate raw lags by cross-correlating every camera's waveform
/// against the first camera's.
///
/// Precondition: all signals share one sample rate. This is checked
/// explicitly, not inferred - mixed rates are a fatal error.
pub fn cross_correlation_lags(signals: &[(String, AudioSignal)]) -> AnalysisResult<LagMap> {
    let (reference_name, reference) = signals
        .first()
        .ok_or_else(|| AnalysisError::InvalidSignal("no signals to correlate".to_string()))?;

    let rates: Vec<u32> = signals.iter().map(|(_, s)| s.sample_rate).collect();
    if rates.windows(2).any(|pair| pair[0] != pair[1]) {
        return Err(AnalysisError::SampleRateMismatch { rates });
    }
    let sample_rate = reference.sample_rate;

    tracing::info!(
        "Correlation reference camera: {}, sample rate: {} Hz",
        reference_name,
        sample_rate
    );

    let mut lags = LagMap::new();
    for (name, signal) in signals {
        let lag_samples = cross_correlate(&reference.samples, &signal.samples)?;
        let lag_secs = lag_samples as f64 / sample_rate as f64;
        lags.insert(name.clone(), lag_secs);
    }

    Ok(lags)
}

/// Estimate raw lags from the first significant brightness change in
/// each camera's frame series.
///
/// Each entry is `(camera, brightness series, fps)`; the detected frame
/// index divided by that camera's own fps gives the lag in seconds.
pub fn brightness_lags(
    series: &[(String, Vec<f64>, f64)],
    threshold: f64,
) -> AnalysisResult<LagMap> {
    let mut lags = LagMap::new();
    for (name, brightness, fps) in series {
        let frame_index =
            crate::analysis::brightness::first_brightness_change(brightness, threshold)?;
        lags.insert(name.clone(), frame_index as f64 / fps);
    }
    Ok(lags)
}

/// Rebase raw lags so the latest-starting camera has lag zero.
///
/// `normalized[k] = max(raw.values()) - raw[k]`. The camera with the
/// largest raw lag started latest in absolute time and needs no front
/// trim; every other camera's normalized lag is the leading footage it
/// must lose. Guarantees `min == 0` and all values non-negative. When
/// every raw lag is equal, every normalized lag is zero.
pub fn normalize(raw: &LagMap) -> SyncResult<NormalizedLagMap> {
    let max = raw.max_value().ok_or(SyncError::NoCameras)?;

    let normalized: BTreeMap<String, f64> = raw
        .iter()
        .map(|(camera, lag)| (camera.to_string(), max - lag))
        .collect();

    tracing::info!("Raw lags: {:?}, normalized lags: {:?}", raw, normalized);

    Ok(NormalizedLagMap::from_normalized(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lag_map(entries: &[(&str, f64)]) -> LagMap {
        entries
            .iter()
            .map(|(name, lag)| (name.to_string(), *lag))
            .collect()
    }

    #[test]
    fn normalize_rebases_onto_latest_starter() {
        // Values taken at source precision from a real three-camera run.
        let raw = lag_map(&[
            ("Cam1", 0.0),
            ("Cam2", 4.3402267573696145),
            ("Cam3", 9.475963718820863),
        ]);

        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.get("Cam1"), Some(9.475963718820863));
        assert_eq!(normalized.get("Cam2"), Some(5.135736961451248));
        assert_eq!(normalized.get("Cam3"), Some(0.0));
    }

    #[test]
    fn normalized_map_has_zero_minimum() {
        let raw = lag_map(&[("a", -3.2), ("b", 0.7), ("c", -0.1)]);
        let normalized = normalize(&raw).unwrap();

        let min = normalized
            .iter()
            .map(|(_, lag)| lag)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(min, 0.0);
        assert!(normalized.iter().all(|(_, lag)| lag >= 0.0));
    }

    #[test]
    fn normalize_round_trips_through_negation() {
        // Negating an already-normalized map makes its max zero;
        // normalizing again recovers the original values.
        let raw = lag_map(&[("a", 1.0), ("b", 2.5), ("c", 4.0)]);
        let normalized = normalize(&raw).unwrap();

        let negated: LagMap = normalized
            .iter()
            .map(|(name, lag)| (name.to_string(), -lag))
            .collect();
        let round_tripped = normalize(&negated).unwrap();

        for (name, lag) in normalized.iter() {
            assert!((round_tripped.get(name).unwrap() - lag).abs() < 1e-12);
        }
    }

    #[test]
    fn equal_lags_normalize_to_all_zero() {
        let raw = lag_map(&[("a", 2.0), ("b", 2.0), ("c", 2.0)]);
        let normalized = normalize(&raw).unwrap();
        assert!(normalized.iter().all(|(_, lag)| lag == 0.0));
    }

    #[test]
    fn normalize_empty_map_errors() {
        assert!(matches!(
            normalize(&LagMap::new()),
            Err(SyncError::NoCameras)
        ));
    }

    #[test]
    fn correlation_lags_require_shared_sample_rate() {
        let signals = vec![
            ("cam_a".to_string(), AudioSignal::new(vec![0.0; 100], 48000)),
            ("cam_b".to_string(), AudioSignal::new(vec![0.0; 100], 44100)),
        ];

        assert!(matches!(
            cross_correlation_lags(&signals),
            Err(AnalysisError::SampleRateMismatch { .. })
        ));
    }

    #[test]
    fn correlation_lags_use_first_camera_as_reference() {
        let base: Vec<f64> = (0..8192)
            .map(|i| {
                let t = i as f64 / 8192.0;
                (2.0 * std::f64::consts::PI * (3.0 + 60.0 * t) * t).sin()
            })
            .collect();

        // cam_b started 1000 samples later: its content leads.
        let mut later = base[1000..].to_vec();
        later.extend(vec![0.0; 1000]);

        let signals = vec![
            ("cam_a".to_string(), AudioSignal::new(base, 1000)),
            ("cam_b".to_string(), AudioSignal::new(later, 1000)),
        ];

        let lags = cross_correlation_lags(&signals).unwrap();
        assert_eq!(lags.get("cam_a"), Some(0.0));
        assert!((lags.get("cam_b").unwrap() - 1.0).abs() < 0.01);
    }

    #[test]
    fn brightness_lags_divide_by_camera_fps() {
        let mut series = vec![0.0; 120];
        for value in series.iter_mut().skip(60) {
            *value = 255.0;
        }

        let input = vec![("cam_a".to_string(), series, 30.0)];
        let lags = brightness_lags(&input, 1000.0).unwrap();
        assert!((lags.get("cam_a").unwrap() - 2.0).abs() < f64::EPSILON);
    }
}
