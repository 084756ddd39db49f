//! Configuration enums used throughout the pipeline.

use serde::{Deserialize, Serialize};

/// Method used to derive per-camera lags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignmentMethod {
    /// Cross-correlation of audio waveforms against a reference camera.
    #[default]
    #[serde(rename = "audio")]
    AudioCrossCorrelation,
    /// First significant brightness change (e.g. a clapperboard flash).
    #[serde(rename = "brightness")]
    BrightnessChange,
}

impl AlignmentMethod {
    /// Whether this method requires an audio track on every camera.
    pub fn requires_audio(&self) -> bool {
        matches!(self, AlignmentMethod::AudioCrossCorrelation)
    }
}

impl std::fmt::Display for AlignmentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentMethod::AudioCrossCorrelation => write!(f, "audio cross-correlation"),
            AlignmentMethod::BrightnessChange => write!(f, "brightness change"),
        }
    }
}

/// Which trim backend produces the output clips.
///
/// Both backends honor the same contract: the output contains exactly the
/// requested frames, in order, with no audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrimMode {
    /// Single re-encode with a start time and duration.
    #[serde(rename = "time")]
    TimeBased,
    /// Frame-accurate decode loop retaining an explicit frame range.
    #[default]
    #[serde(rename = "frame")]
    FrameIndexed,
}

impl std::fmt::Display for TrimMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrimMode::TimeBased => write!(f, "time-based"),
            TrimMode::FrameIndexed => write!(f, "frame-indexed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_method_requires_audio() {
        assert!(AlignmentMethod::AudioCrossCorrelation.requires_audio());
        assert!(!AlignmentMethod::BrightnessChange.requires_audio());
    }

    #[test]
    fn enums_round_trip_through_toml() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            method: AlignmentMethod,
            backend: TrimMode,
        }

        let text = "method = \"brightness\"\nbackend = \"time\"\n";
        let parsed: Wrapper = toml::from_str(text).unwrap();
        assert_eq!(parsed.method, AlignmentMethod::BrightnessChange);
        assert_eq!(parsed.backend, TrimMode::TimeBased);

        let dumped = toml::to_string(&parsed).unwrap();
        assert!(dumped.contains("brightness"));
        assert!(dumped.contains("time"));
    }
}
