//! Toolchain binary checks and shared process helpers.

use std::io;
use std::process::{Command, Stdio};

use super::{MediaError, MediaResult};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Verify that ffmpeg is on PATH. Fatal environment error if not.
pub fn check_for_ffmpeg() -> MediaResult<()> {
    check_tool(FFMPEG)
}

/// Verify that ffprobe is on PATH. Fatal environment error if not.
pub fn check_for_ffprobe() -> MediaResult<()> {
    check_tool(FFPROBE)
}

fn check_tool(tool: &str) -> MediaResult<()> {
    let result = Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(MediaError::ToolNotFound {
            tool: tool.to_string(),
        }),
        Err(e) => Err(MediaError::Io(e)),
    }
}

/// Run a prepared command to completion, capturing stderr for diagnostics.
///
/// Maps a missing binary to `ToolNotFound` and a non-zero exit to
/// `CommandFailed` with the stderr tail included.
pub fn run_tool(tool: &str, cmd: &mut Command) -> MediaResult<Vec<u8>> {
    tracing::debug!("Running {}: {:?}", tool, cmd);

    let output = cmd.output().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            MediaError::ToolNotFound {
                tool: tool.to_string(),
            }
        } else {
            MediaError::Io(e)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::command_failed(
            tool,
            output.status.code().unwrap_or(-1),
            stderr_tail(&stderr),
        ));
    }

    Ok(output.stdout)
}

/// Last few lines of stderr, which is where ffmpeg puts the actual error.
fn stderr_tail(stderr: &str) -> String {
    const TAIL_LINES: usize = 5;
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}
