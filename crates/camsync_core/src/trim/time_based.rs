//! Time-based trim backend: one ffmpeg re-encode with `-ss`/`-t`.

use std::path::Path;
use std::process::Command;

use crate::media::tools::{run_tool, FFMPEG};
use crate::media::MediaResult;
use crate::models::{CameraRecording, FrameRange};

use super::VideoTrimmer;

/// Trims by start time and duration.
///
/// Fast and simple, but cut points land on the encoder's timing rather
/// than exact frame indices; the frame-indexed backend is the default
/// when exactness matters.
pub struct TimeBasedTrimmer;

impl TimeBasedTrimmer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeBasedTrimmer {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoTrimmer for TimeBasedTrimmer {
    fn name(&self) -> &str {
        "time-based"
    }

    fn trim(
        &self,
        recording: &CameraRecording,
        range: &FrameRange,
        output: &Path,
    ) -> MediaResult<()> {
        let start_secs = range.start_frame as f64 / recording.fps;
        let duration_secs = range.frame_count as f64 / recording.fps;

        tracing::info!(
            "Trimming {} from {:.3}s for {:.3}s",
            recording.name,
            start_secs,
            duration_secs
        );

        run_tool(
            FFMPEG,
            Command::new(FFMPEG)
                .arg("-i")
                .arg(&recording.path)
                .arg("-ss")
                .arg(format!("{}", start_secs))
                .arg("-t")
                .arg(format!("{}", duration_secs))
                .arg("-an")
                .arg("-y")
                .arg(output),
        )?;

        Ok(())
    }
}
