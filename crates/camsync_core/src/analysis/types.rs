//! Core types for lag estimation.

use thiserror::Error;

use crate::media::MediaError;

/// A 1-D alignment signal: mono audio samples tagged with their rate.
#[derive(Debug, Clone)]
pub struct AudioSignal {
    /// Samples as f64 (mono).
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioSignal {
    /// Create a signal from samples.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds (`samples / sample_rate`).
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the signal has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Errors from lag estimation.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A signal is unusable for correlation (empty, too short).
    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    /// Signals being correlated together do not share a sample rate.
    #[error("Sample rate mismatch: {rates:?} - all signals must share one rate before correlation")]
    SampleRateMismatch { rates: Vec<u32> },

    /// Underlying media toolchain failure during signal extraction.
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
