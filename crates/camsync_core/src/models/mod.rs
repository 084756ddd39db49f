//! Core data model for the synchronization pipeline.

mod enums;
mod lags;
mod media;

pub use enums::{AlignmentMethod, TrimMode};
pub use lags::{LagMap, NormalizedLagMap};
pub use media::{CameraRecording, FrameRange, Rotation, RotationAngle};
