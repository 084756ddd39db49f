//! Concrete pipeline steps in execution order.

mod attach_audio;
mod estimate_lags;
mod extract_signals;
mod normalize_rates;
mod probe;
mod report;
mod resolve_window;
mod trim_videos;
mod verify;

pub use attach_audio::AttachAudioStep;
pub use estimate_lags::EstimateLagsStep;
pub use extract_signals::ExtractSignalsStep;
pub use normalize_rates::NormalizeRatesStep;
pub use probe::ProbeStep;
pub use report::DebugDumpStep;
pub use resolve_window::ResolveWindowStep;
pub use trim_videos::TrimVideosStep;
pub use verify::VerifyFrameCountsStep;
