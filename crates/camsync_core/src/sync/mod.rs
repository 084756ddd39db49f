//! Lag normalization and common-window resolution.

pub mod lags;
pub mod window;

use thiserror::Error;

pub use window::SyncWindow;

/// Errors from lag normalization and window resolution.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No cameras to synchronize.
    #[error("No cameras to synchronize")]
    NoCameras,

    /// A camera is missing from the lag map.
    #[error("No lag computed for camera '{camera}'")]
    MissingLag { camera: String },

    /// Cameras disagree on frame rate after normalization.
    #[error("Non-uniform frame rates after normalization: {fps_values:?}")]
    NonUniformFps { fps_values: Vec<f64> },

    /// The post-lag overlap across all cameras is zero or negative.
    #[error(
        "No common overlapping window across cameras (computed {common_window_secs:.3}s); \
         per-camera available footage: {availability:?}"
    )]
    NoOverlap {
        common_window_secs: f64,
        availability: Vec<(String, f64)>,
    },
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
