//! Frame-indexed trim backend: exact decode/re-encode loop.
//!
//! Streams raw frames from an ffmpeg decoder pipe, retains exactly the
//! requested half-open frame range, and feeds the retained frames into
//! an ffmpeg encoder pipe. Sources whose rotation metadata disagrees
//! with their pixel orientation are decoded with auto-rotation disabled
//! and a compensating transpose filter.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::media::tools::FFMPEG;
use crate::media::{MediaError, MediaResult};
use crate::models::{CameraRecording, FrameRange, Rotation};

use super::VideoTrimmer;

const PIXEL_FORMAT: &str = "bgr24";
const BYTES_PER_PIXEL: usize = 3;

/// Frame-accurate trimmer. The default backend.
pub struct FrameIndexedTrimmer;

impl FrameIndexedTrimmer {
    pub fn new() -> Self {
        Self
    }

    fn spawn_decoder(&self, recording: &CameraRecording) -> MediaResult<Child> {
        let mut cmd = Command::new(FFMPEG);

        // Reversed-metadata sources get decoded in pixel orientation and
        // rotated explicitly; everything else relies on auto-rotation.
        if recording.rotation == Rotation::ReversedMetadata {
            tracing::info!(
                "{} has reversed rotation metadata, applying transpose filter",
                recording.name
            );
            cmd.arg("-noautorotate");
        }

        cmd.arg("-i").arg(&recording.path);

        if recording.rotation == Rotation::ReversedMetadata {
            if let Some(filter) = recording.rotation.transpose_filter() {
                cmd.arg("-vf").arg(filter);
            }
        }

        cmd.arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg(PIXEL_FORMAT)
            .arg("pipe:1")
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        spawn(cmd)
    }

    fn spawn_encoder(
        &self,
        recording: &CameraRecording,
        output: &Path,
    ) -> MediaResult<Child> {
        let (width, height) = output_dimensions(recording);

        let mut cmd = Command::new(FFMPEG);
        cmd.arg("-y")
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg(PIXEL_FORMAT)
            .arg("-s")
            .arg(format!("{}x{}", width, height))
            .arg("-r")
            .arg(format!("{}", recording.fps))
            .arg("-i")
            .arg("pipe:0")
            .arg("-an")
            .arg("-pix_fmt")
            .arg("yuv420p")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        spawn(cmd)
    }
}

impl Default for FrameIndexedTrimmer {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoTrimmer for FrameIndexedTrimmer {
    fn name(&self) -> &str {
        "frame-indexed"
    }

    fn trim(
        &self,
        recording: &CameraRecording,
        range: &FrameRange,
        output: &Path,
    ) -> MediaResult<()> {
        let (width, height) = output_dimensions(recording);
        let frame_bytes = width as usize * height as usize * BYTES_PER_PIXEL;

        tracing::info!(
            "Trimming {} to frames [{}, {})",
            recording.name,
            range.start_frame,
            range.end_frame()
        );

        let mut decoder = self.spawn_decoder(recording)?;
        let mut decoder_out = decoder.stdout.take().ok_or_else(|| {
            MediaError::command_failed(FFMPEG, -1, "failed to capture decoder stdout")
        })?;

        let mut encoder = self.spawn_encoder(recording, output)?;
        let mut encoder_in = encoder.stdin.take().ok_or_else(|| {
            MediaError::command_failed(FFMPEG, -1, "failed to capture encoder stdin")
        })?;

        let written = copy_frame_range(
            &mut decoder_out,
            &mut encoder_in,
            frame_bytes,
            range,
        );

        // Close the encoder's stdin so it can finalize the file, and
        // stop the decoder, which may still be mid-stream.
        drop(encoder_in);
        let _ = decoder.kill();
        let _ = decoder.wait();

        let encoder_status = encoder.wait().map_err(MediaError::Io)?;
        if !encoder_status.success() {
            return Err(MediaError::command_failed(
                FFMPEG,
                encoder_status.code().unwrap_or(-1),
                format!("encoding trimmed output for camera '{}'", recording.name),
            ));
        }

        let written = written?;
        if written < range.frame_count {
            tracing::warn!(
                "{}: source ended after {} of {} requested frames; output is under-length",
                recording.name,
                written,
                range.frame_count
            );
        }

        Ok(())
    }
}

/// Stream frames from decoder to encoder, keeping only `range`.
///
/// Returns the number of frames actually written, which is less than
/// requested when the source runs out early.
fn copy_frame_range(
    decoder_out: &mut impl Read,
    encoder_in: &mut ChildStdin,
    frame_bytes: usize,
    range: &FrameRange,
) -> MediaResult<u64> {
    let mut frame = vec![0u8; frame_bytes];
    let mut current_frame: u64 = 0;
    let mut written: u64 = 0;

    while written < range.frame_count {
        if !read_exact_or_eof(decoder_out, &mut frame)? {
            break;
        }

        if range.contains(current_frame) {
            encoder_in.write_all(&frame)?;
            written += 1;
        }
        current_frame += 1;
    }

    encoder_in.flush()?;
    Ok(written)
}

/// Fill the buffer completely, or return false on a clean EOF before
/// any byte of the frame was read. A partial trailing frame is dropped.
fn read_exact_or_eof(reader: &mut impl Read, buf: &mut [u8]) -> MediaResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(MediaError::Io(e)),
        }
    }
    Ok(true)
}

/// Frame dimensions as emitted by the decoder pipe.
///
/// Quarter-turn rotations (including the reversed-metadata transpose)
/// swap width and height; the probe reports stored dimensions.
fn output_dimensions(recording: &CameraRecording) -> (u32, u32) {
    match recording.rotation {
        Rotation::ReversedMetadata => (recording.width, recording.height),
        rotation if rotation.swaps_dimensions() => (recording.height, recording.width),
        _ => (recording.width, recording.height),
    }
}

fn spawn(mut cmd: Command) -> MediaResult<Child> {
    tracing::debug!("Spawning: {:?}", cmd);
    cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MediaError::ToolNotFound {
                tool: FFMPEG.to_string(),
            }
        } else {
            MediaError::Io(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RotationAngle;
    use std::path::PathBuf;

    fn recording(rotation: Rotation) -> CameraRecording {
        CameraRecording {
            name: "cam".to_string(),
            path: PathBuf::from("cam.mp4"),
            duration_secs: 10.0,
            fps: 30.0,
            sample_rate: Some(48000),
            width: 1920,
            height: 1080,
            rotation,
        }
    }

    #[test]
    fn quarter_turns_swap_output_dimensions() {
        assert_eq!(
            output_dimensions(&recording(Rotation::Rotated(RotationAngle::Deg90))),
            (1080, 1920)
        );
        assert_eq!(
            output_dimensions(&recording(Rotation::Rotated(RotationAngle::Deg180))),
            (1920, 1080)
        );
        assert_eq!(
            output_dimensions(&recording(Rotation::NotRotated)),
            (1920, 1080)
        );
    }

    #[test]
    fn reversed_metadata_keeps_probed_display_dimensions() {
        // For reversed-metadata sources the probe already reports the
        // intended display orientation; the transpose restores it.
        assert_eq!(
            output_dimensions(&recording(Rotation::ReversedMetadata)),
            (1920, 1080)
        );
    }

    #[test]
    fn reader_yields_each_full_frame() {
        // Five 4-byte "frames": 0,1,2,3,4.
        let mut source: Vec<u8> = Vec::new();
        for i in 0u8..5 {
            source.extend_from_slice(&[i; 4]);
        }

        let mut reader = &source[..];
        let mut frame = [0u8; 4];
        let mut seen = Vec::new();
        while read_exact_or_eof(&mut reader, &mut frame).unwrap() {
            seen.push(frame[0]);
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn partial_trailing_frame_is_dropped() {
        let mut source: Vec<u8> = vec![7; 4];
        source.extend_from_slice(&[9, 9]); // incomplete frame

        let mut reader = &source[..];
        let mut frame = [0u8; 4];
        assert!(read_exact_or_eof(&mut reader, &mut frame).unwrap());
        assert!(!read_exact_or_eof(&mut reader, &mut frame).unwrap());
    }
}
