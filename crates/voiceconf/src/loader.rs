//! Config file discovery, loading, and environment variable overlay.

use std::env;
use std::path::{Path, PathBuf};

use crate::{ConfigError, OutputFormat, VoiceleadConfig};

/// Information about where config values came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// System and user files are returned only if they exist. A CLI path is
/// always returned, replacing `./voicelead.toml`, so that a mistyped path
/// fails loudly when it is read.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/voicelead/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("voicelead/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("voicelead.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Start from defaults and layer each file on top, in order.
pub fn load_files(files: &[PathBuf]) -> Result<(VoiceleadConfig, ConfigSources), ConfigError> {
    let mut config = VoiceleadConfig::default();
    let mut sources = ConfigSources::default();
    for path in files {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.clone(),
            source: e,
        })?;
        apply_toml(&mut config, &contents, path)?;
        sources.files.push(path.clone());
    }
    Ok((config, sources))
}

/// Overlay the keys present in a TOML document. Absent keys keep their
/// current value.
pub fn apply_toml(config: &mut VoiceleadConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let table: toml::Table = contents
        .parse()
        .map_err(|e: toml::de::Error| parse_error(e.to_string()))?;

    if let Some(rules) = table.get("rules").and_then(|v| v.as_table()) {
        match rules.get("enabled") {
            Some(toml::Value::Array(ids)) => {
                config.rules.enabled = ids
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect();
            }
            Some(toml::Value::String(ids)) => config.rules.enabled = split_ids(ids),
            Some(other) => {
                return Err(parse_error(format!(
                    "rules.enabled must be a list of rule names, found {}",
                    other.type_str()
                )))
            }
            None => {}
        }
    }

    if let Some(output) = table.get("output").and_then(|v| v.as_table()) {
        if let Some(v) = output.get("format").and_then(|v| v.as_str()) {
            config.output.format = v.parse::<OutputFormat>().map_err(parse_error)?;
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    Ok(())
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut VoiceleadConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Environment overlay with an injectable lookup.
pub fn apply_overrides_from<F>(config: &mut VoiceleadConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("VOICELEAD_RULES") {
        config.rules.enabled = split_ids(&v);
        sources.env_overrides.push("VOICELEAD_RULES".to_string());
    }

    // Unparseable formats are ignored, same as a missing variable.
    if let Some(v) = lookup("VOICELEAD_OUTPUT") {
        if let Ok(format) = v.parse() {
            config.output.format = format;
            sources.env_overrides.push("VOICELEAD_OUTPUT".to_string());
        }
    }

    if let Some(v) = lookup("VOICELEAD_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("VOICELEAD_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Comma-separated rule identifiers, blanks dropped.
pub fn split_ids(ids: &str) -> Vec<String> {
    ids.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
