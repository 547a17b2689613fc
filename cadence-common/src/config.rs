//! Configuration loading and library path resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the library storage path
pub const LIBRARY_PATH_ENV: &str = "CADENCE_LIBRARY_PATH";

/// Default crossfade overlap in seconds
pub const DEFAULT_CROSSFADE_SECONDS: u32 = 5;

/// Default number of playback events retained in history
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Contents of `config.toml`
///
/// Every section is optional; missing values fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub logging: LoggingConfig,
    pub equalizer: EqualizerSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// JSON file holding the track library
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Overlap applied between consecutive playlist tracks
    pub crossfade_seconds: u32,
    /// Bounded history size
    pub history_capacity: usize,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            crossfade_seconds: DEFAULT_CROSSFADE_SECONDS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl PlaybackSettings {
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(Error::Config(
                "playback.history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EqualizerSettings {
    /// User presets, registered after the built-in ones
    pub presets: Vec<PresetDefinition>,
}

/// Equalizer preset as written in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct PresetDefinition {
    pub name: String,
    #[serde(default)]
    pub gains: BTreeMap<String, f64>,
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.playback.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `explicit` if given, else the platform config file if it
    /// exists, else defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_file() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Library path resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent default
pub fn resolve_library_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.library.path {
        return path.clone();
    }

    default_library_path()
}

/// Platform config file (`~/.config/cadence/config.toml` on Linux)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cadence").join("config.toml"))
}

/// OS-dependent default library file
pub fn default_library_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cadence"))
        .unwrap_or_else(|| PathBuf::from("./cadence_data"))
        .join("library.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.playback.crossfade_seconds, 5);
        assert_eq!(config.playback.history_capacity, 100);
        assert_eq!(config.logging.level, "info");
        assert!(config.library.path.is_none());
        assert!(config.equalizer.presets.is_empty());
    }

    #[test]
    fn test_full_config_parses() {
        let config = TomlConfig::from_toml_str(
            r#"
            [library]
            path = "/tmp/cadence/library.json"

            [playback]
            crossfade_seconds = 8
            history_capacity = 20

            [logging]
            level = "debug"

            [[equalizer.presets]]
            name = "vocal"
            gains = { mid = 2.0, presence = 3.5 }
            "#,
        )
        .unwrap();

        assert_eq!(
            config.library.path,
            Some(PathBuf::from("/tmp/cadence/library.json"))
        );
        assert_eq!(config.playback.crossfade_seconds, 8);
        assert_eq!(config.playback.history_capacity, 20);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.equalizer.presets.len(), 1);
        assert_eq!(config.equalizer.presets[0].name, "vocal");
        assert_eq!(config.equalizer.presets[0].gains.get("presence"), Some(&3.5));
    }

    #[test]
    fn test_zero_history_capacity_rejected() {
        let result = TomlConfig::from_toml_str("[playback]\nhistory_capacity = 0\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_config_rejected() {
        let result = TomlConfig::from_toml_str("[playback\ncrossfade_seconds = ");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_default_library_path_is_json_file() {
        let path = default_library_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("library.json"));
    }
}
