//! Boundary with the external media toolchain (ffmpeg/ffprobe).
//!
//! Every function here is a blocking call into an external process.
//! Failures are never retried; they surface as `MediaError` and abort
//! the whole synchronization run.

pub mod audio;
pub mod mux;
pub mod probe;
pub mod tools;
mod types;

pub use types::{MediaError, MediaResult};
