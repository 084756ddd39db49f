//! Signal extraction and lag estimation primitives.
//!
//! The correlation and brightness functions here are pure: they take
//! sample arrays and return lags, with no I/O. Pulling signals out of
//! media files lives in [`brightness`] (frame decode) and
//! [`crate::media::audio`] (waveform decode).

pub mod brightness;
pub mod correlation;
mod types;

pub use types::{AnalysisError, AnalysisResult, AudioSignal};
