//! Reattaching trimmed audio onto trimmed video.

use std::path::Path;
use std::process::Command;

use super::tools::{run_tool, FFMPEG};
use super::MediaResult;

/// Mux an audio file onto a video, copying the video stream and encoding
/// the audio as AAC.
pub fn attach_audio(video: &Path, audio: &Path, output: &Path) -> MediaResult<()> {
    run_tool(
        FFMPEG,
        Command::new(FFMPEG)
            .arg("-y")
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .arg("-c:v")
            .arg("copy")
            .arg("-c:a")
            .arg("aac")
            .arg(output),
    )?;
    Ok(())
}
