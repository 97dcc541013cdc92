//! Configuration loading for notescore.
//!
//! Kept separate from the scoring library so the scorer itself stays a set of
//! pure functions over explicit parameters. The binary loads a `ScoreConfig`
//! once and converts it into scoring parameters.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/notescore/config.toml` (system)
//! 2. `~/.config/notescore/config.toml` (user)
//! 3. `./notescore.toml` (local override, replaced by `--config` when given)
//! 4. Environment variables (`NOTESCORE_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [tolerance]
//! onset = 0.05
//! pitch_cents = 50.0
//!
//! [shift]
//! time = -0.02
//!
//! [paths]
//! annotations = "~/datasets/mir-st500/annotations.json"
//! predictions = "./out/predictions.json"
//!
//! [telemetry]
//! log_level = "debug"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{PathsConfig, ShiftConfig, TelemetryConfig, ToleranceConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete notescore configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    #[serde(default)]
    pub tolerance: ToleranceConfig,

    #[serde(default)]
    pub shift: ShiftConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ScoreConfig {
    /// Load configuration and report which files and env vars contributed.
    ///
    /// `config_path` replaces the local `./notescore.toml` override and must
    /// exist. System and user files still load first. Files are merged key by
    /// key before defaults fill the gaps, so a later file that restates a
    /// default still overrides an earlier one.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut merged = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path)? {
            let table = loader::read_table(&path)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(path);
        }

        let mut config = loader::config_from_table(&merged);
        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# notescore configuration\n\n");

        output.push_str("[tolerance]\n");
        output.push_str(&format!("onset = {:?}\n", self.tolerance.onset));
        output.push_str(&format!("pitch_cents = {:?}\n", self.tolerance.pitch_cents));
        output.push_str(&format!("offset_ratio = {:?}\n", self.tolerance.offset_ratio));
        output.push_str(&format!("offset_min = {:?}\n", self.tolerance.offset_min));
        output.push_str(&format!("strict = {}\n", self.tolerance.strict));
        output.push_str(&format!(
            "onset_tier_checks_pitch = {}\n",
            self.tolerance.onset_tier_checks_pitch
        ));

        output.push_str("\n[shift]\n");
        output.push_str(&format!("time = {:?}\n", self.shift.time));
        output.push_str(&format!("pitch_semitones = {:?}\n", self.shift.pitch_semitones));

        output.push_str("\n[paths]\n");
        output.push_str(&format!(
            "annotations = \"{}\"\n",
            self.paths.annotations.display()
        ));
        output.push_str(&format!(
            "predictions = \"{}\"\n",
            self.paths.predictions.display()
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScoreConfig::default();
        assert_eq!(config.tolerance.onset, 0.05);
        assert_eq!(config.tolerance.pitch_cents, 50.0);
        assert!(config.tolerance.onset_tier_checks_pitch);
        assert_eq!(config.shift.time, 0.0);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_to_toml_round_trips_through_parser() {
        let mut config = ScoreConfig::default();
        config.tolerance.onset = 0.1;
        config.shift.time = -0.25;
        config.paths.predictions = PathBuf::from("/tmp/pred.json");

        let rendered = config.to_toml();
        assert!(rendered.contains("[tolerance]"));
        assert!(rendered.contains("onset = 0.1\n"));

        let table: toml::Table = rendered.parse().unwrap();
        let parsed = loader::config_from_table(&table);
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[tolerance]\npitch_cents = 25.0\n").unwrap();

        let (config, sources) = ScoreConfig::load_with_sources_from(Some(&path)).unwrap();
        assert_eq!(config.tolerance.pitch_cents, 25.0);
        assert!(sources.files.contains(&path));
    }

    #[test]
    fn test_missing_explicit_config_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.toml");

        let err = ScoreConfig::load_with_sources_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("typo.toml"));
    }
}
