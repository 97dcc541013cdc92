//! Config sections: matching tolerances, clock/tuning shifts, input paths, telemetry.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tolerance windows used when deciding whether two notes match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Maximum onset distance in seconds.
    /// Default: 0.05
    #[serde(default = "ToleranceConfig::default_onset")]
    pub onset: f64,

    /// Maximum pitch distance in cents.
    /// Default: 50
    #[serde(default = "ToleranceConfig::default_pitch_cents")]
    pub pitch_cents: f64,

    /// Offset window as a fraction of the reference note's duration.
    /// Default: 0.2
    #[serde(default = "ToleranceConfig::default_offset_ratio")]
    pub offset_ratio: f64,

    /// Lower bound of the offset window in seconds.
    /// Default: 0.05
    #[serde(default = "ToleranceConfig::default_offset_min")]
    pub offset_min: f64,

    /// Use strict `<` comparisons instead of `<=`.
    #[serde(default)]
    pub strict: bool,

    /// Whether the onset-only tier (COn) still requires a pitch hit.
    /// Default: true
    #[serde(default = "ToleranceConfig::default_onset_tier_checks_pitch")]
    pub onset_tier_checks_pitch: bool,
}

impl ToleranceConfig {
    fn default_onset() -> f64 {
        0.05
    }

    fn default_pitch_cents() -> f64 {
        50.0
    }

    fn default_offset_ratio() -> f64 {
        0.2
    }

    fn default_offset_min() -> f64 {
        0.05
    }

    fn default_onset_tier_checks_pitch() -> bool {
        true
    }
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            onset: Self::default_onset(),
            pitch_cents: Self::default_pitch_cents(),
            offset_ratio: Self::default_offset_ratio(),
            offset_min: Self::default_offset_min(),
            strict: false,
            onset_tier_checks_pitch: Self::default_onset_tier_checks_pitch(),
        }
    }
}

/// Constant corrections applied before matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShiftConfig {
    /// Clock offset in seconds. Positive shifts the estimate later,
    /// negative shifts the reference later.
    #[serde(default)]
    pub time: f64,

    /// Semitones added to every reference pitch.
    #[serde(default)]
    pub pitch_semitones: f64,
}

/// Default input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Ground-truth annotations keyed by song ID.
    /// Default: ./data/annotations.json
    #[serde(default = "PathsConfig::default_annotations")]
    pub annotations: PathBuf,

    /// Transcription output keyed by song ID.
    /// Default: ./data/predictions.json
    #[serde(default = "PathsConfig::default_predictions")]
    pub predictions: PathBuf,
}

impl PathsConfig {
    fn default_annotations() -> PathBuf {
        PathBuf::from("./data/annotations.json")
    }

    fn default_predictions() -> PathBuf {
        PathBuf::from("./data/predictions.json")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            annotations: Self::default_annotations(),
            predictions: Self::default_predictions(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
