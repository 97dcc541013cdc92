//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, ScoreConfig};
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
    /// Numeric environment variables whose values did not parse, with the raw value
    pub ignored_env: Vec<(String, String)>,
}

/// Discover config files, optionally with a CLI override path.
///
/// Returns paths in load order (system, user, local). System, user and local
/// files are only returned when they exist. An explicit `cli_path` replaces
/// the local file and must exist.
pub fn discover_config_files_with_override(
    cli_path: Option<&Path>,
) -> Result<Vec<PathBuf>, ConfigError> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/notescore/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("notescore/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such config file"),
            });
        }
        files.push(path.to_path_buf());
        return Ok(files);
    }

    let local = PathBuf::from("notescore.toml");
    if local.exists() {
        files.push(local);
    }

    Ok(files)
}

/// Read a config file as a raw TOML table.
pub fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_table(&contents, path)
}

fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Overlay `overlay` onto `base` key by key, descending into sub-tables.
///
/// Any key present in `overlay` wins, even when it repeats a default value.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

/// Build a config from a (merged) table. Absent keys keep their defaults.
pub fn config_from_table(table: &toml::Table) -> ScoreConfig {
    let mut config = ScoreConfig::default();

    if let Some(tolerance) = table.get("tolerance").and_then(|v| v.as_table()) {
        if let Some(v) = tolerance.get("onset").and_then(as_number) {
            config.tolerance.onset = v;
        }
        if let Some(v) = tolerance.get("pitch_cents").and_then(as_number) {
            config.tolerance.pitch_cents = v;
        }
        if let Some(v) = tolerance.get("offset_ratio").and_then(as_number) {
            config.tolerance.offset_ratio = v;
        }
        if let Some(v) = tolerance.get("offset_min").and_then(as_number) {
            config.tolerance.offset_min = v;
        }
        if let Some(v) = tolerance.get("strict").and_then(|v| v.as_bool()) {
            config.tolerance.strict = v;
        }
        if let Some(v) = tolerance
            .get("onset_tier_checks_pitch")
            .and_then(|v| v.as_bool())
        {
            config.tolerance.onset_tier_checks_pitch = v;
        }
    }

    if let Some(shift) = table.get("shift").and_then(|v| v.as_table()) {
        if let Some(v) = shift.get("time").and_then(as_number) {
            config.shift.time = v;
        }
        if let Some(v) = shift.get("pitch_semitones").and_then(as_number) {
            config.shift.pitch_semitones = v;
        }
    }

    if let Some(paths) = table.get("paths").and_then(|v| v.as_table()) {
        if let Some(v) = paths.get("annotations").and_then(|v| v.as_str()) {
            config.paths.annotations = expand_path(v);
        }
        if let Some(v) = paths.get("predictions").and_then(|v| v.as_str()) {
            config.paths.predictions = expand_path(v);
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    config
}

/// TOML integers are accepted wherever a float is expected (`onset = 1`).
fn as_number(value: &toml::Value) -> Option<f64> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut ScoreConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

fn apply_overrides_from<F>(config: &mut ScoreConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let numeric: [(&str, &mut f64); 4] = [
        ("NOTESCORE_ONSET_TOLERANCE", &mut config.tolerance.onset),
        ("NOTESCORE_PITCH_TOLERANCE", &mut config.tolerance.pitch_cents),
        ("NOTESCORE_TIME_SHIFT", &mut config.shift.time),
        ("NOTESCORE_PITCH_SHIFT", &mut config.shift.pitch_semitones),
    ];
    for (key, slot) in numeric {
        if let Some(v) = lookup(key) {
            match v.trim().parse::<f64>() {
                Ok(parsed) => {
                    *slot = parsed;
                    sources.env_overrides.push(key.to_string());
                }
                Err(_) => sources.ignored_env.push((key.to_string(), v)),
            }
        }
    }

    if let Some(v) = lookup("NOTESCORE_ANNOTATIONS") {
        config.paths.annotations = expand_path(&v);
        sources.env_overrides.push("NOTESCORE_ANNOTATIONS".to_string());
    }
    if let Some(v) = lookup("NOTESCORE_PREDICTIONS") {
        config.paths.predictions = expand_path(&v);
        sources.env_overrides.push("NOTESCORE_PREDICTIONS".to_string());
    }

    if let Some(v) = lookup("NOTESCORE_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("NOTESCORE_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
