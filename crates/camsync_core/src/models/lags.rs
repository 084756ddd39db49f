//! Lag value maps keyed by camera name.
//!
//! `LagMap` holds raw lags as produced by an estimator: signed, relative
//! to an estimator-chosen reference. `NormalizedLagMap` is the rebased
//! form where the latest-starting camera sits at zero and every other
//! camera carries the positive front-trim it needs. The normalized type
//! can only be built through [`crate::sync::lags::normalize`], so its
//! invariants hold by construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw per-camera lags in seconds, keyed by camera name.
///
/// Backed by a `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LagMap(BTreeMap<String, f64>);

impl LagMap {
    /// Create an empty lag map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record a camera's raw lag.
    pub fn insert(&mut self, camera: impl Into<String>, lag_secs: f64) {
        self.0.insert(camera.into(), lag_secs);
    }

    /// Look up a camera's raw lag.
    pub fn get(&self, camera: &str) -> Option<f64> {
        self.0.get(camera).copied()
    }

    /// Iterate over `(camera, lag)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, &lag)| (name.as_str(), lag))
    }

    /// Number of cameras in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The largest raw lag, i.e. the latest-starting camera's value.
    pub fn max_value(&self) -> Option<f64> {
        self.0.values().copied().fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
    }
}

impl FromIterator<(String, f64)> for LagMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Normalized per-camera lags: minimum is zero, all values non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLagMap(BTreeMap<String, f64>);

impl NormalizedLagMap {
    /// Build from pre-normalized values.
    ///
    /// Callers outside the crate go through `sync::lags::normalize`.
    pub(crate) fn from_normalized(map: BTreeMap<String, f64>) -> Self {
        debug_assert!(map.values().all(|&v| v >= 0.0));
        Self(map)
    }

    /// Look up a camera's normalized lag.
    pub fn get(&self, camera: &str) -> Option<f64> {
        self.0.get(camera).copied()
    }

    /// Iterate over `(camera, lag)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, &lag)| (name.as_str(), lag))
    }

    /// Number of cameras in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Access the underlying map (for serialization into debug artifacts).
    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }
}
