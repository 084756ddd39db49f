//! Camsync Core - temporal alignment engine for multi-camera recordings.
//!
//! This crate synchronizes multiple recordings of the same event, captured
//! by cameras with uncoordinated start times, so that every output video
//! begins and ends at the same real-world instant. It derives per-camera
//! time offsets from audio cross-correlation or a brightness-change
//! heuristic, computes the maximal common overlapping window, and trims
//! each camera to an exact frame range.
//!
//! All business logic lives here with zero UI dependencies; a CLI or GUI
//! front-end is expected to drive [`orchestrator::synchronize_folder`].

pub mod analysis;
pub mod config;
pub mod debug;
pub mod discovery;
pub mod logging;
pub mod media;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod sync;
pub mod trim;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
