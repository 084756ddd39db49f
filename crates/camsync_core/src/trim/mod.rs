//! Trim executors producing frame-accurate output clips.
//!
//! Two interchangeable backends implement the same contract: given a
//! camera and a half-open frame range, write a new file containing
//! exactly those frames in order, re-encoded, with no audio track
//! (audio is reattached in a later step). Backend selection is a
//! configuration choice.

mod frame_indexed;
mod time_based;

use std::path::Path;

pub use frame_indexed::FrameIndexedTrimmer;
pub use time_based::TimeBasedTrimmer;

use crate::media::MediaResult;
use crate::models::{CameraRecording, FrameRange, TrimMode};

/// Trait for trim backends.
///
/// If the source holds fewer frames than requested, the backend writes
/// as many as it has; the caller detects under-length output through the
/// downstream frame-count equality check.
pub trait VideoTrimmer: Send + Sync {
    /// Backend name (for logging).
    fn name(&self) -> &str;

    /// Write `range` from `recording` to `output`.
    fn trim(
        &self,
        recording: &CameraRecording,
        range: &FrameRange,
        output: &Path,
    ) -> MediaResult<()>;
}

/// Construct the trim backend for a configured mode.
pub fn create_trimmer(mode: TrimMode) -> Box<dyn VideoTrimmer> {
    match mode {
        TrimMode::TimeBased => Box::new(TimeBasedTrimmer::new()),
        TrimMode::FrameIndexed => Box::new(FrameIndexedTrimmer::new()),
    }
}
