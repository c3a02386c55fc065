//! TOML-based settings.
//!
//! Stores the subset of user preferences the session engine consumes:
//! - Pre-countdown length and warning threshold
//! - Sound and vibration cue toggles
//!
//! Configuration is read from `~/.config/intervalo/config.toml`. The file is
//! owned by the settings UI; this crate only reads it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cues::CueOutput;
use crate::error::ConfigError;

/// Upper bound accepted for `session.pre_countdown_seconds`.
pub const MAX_PRE_COUNTDOWN_SECS: u32 = 60;

/// Session timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_pre_countdown")]
    pub pre_countdown_seconds: u32,
    #[serde(default = "default_warning")]
    pub warning_seconds_before_end: u64,
}

/// Cue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuesConfig {
    #[serde(default = "default_true")]
    pub enable_sounds: bool,
    #[serde(default = "default_true")]
    pub enable_vibration: bool,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cues: CuesConfig,
}

/// Engine-facing settings, flattened out of [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub pre_countdown_secs: u32,
    pub warning_secs_before_end: u64,
    pub enable_sounds: bool,
    pub enable_vibration: bool,
}

impl Settings {
    pub fn cue_output(&self) -> CueOutput {
        CueOutput {
            sound: self.enable_sounds,
            vibration: self.enable_vibration,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

fn default_pre_countdown() -> u32 {
    3
}
fn default_warning() -> u64 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pre_countdown_seconds: default_pre_countdown(),
            warning_seconds_before_end: default_warning(),
        }
    }
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self {
            enable_sounds: true,
            enable_vibration: true,
        }
    }
}

/// Returns `~/.config/intervalo[-dev]/` based on INTERVALO_ENV.
///
/// Set INTERVALO_ENV=dev to use the development directory.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .ok_or_else(|| ConfigError::DirUnavailable("home directory not found".into()))?
        .join(".config");

    let env = std::env::var("INTERVALO_ENV").unwrap_or_else(|_| "production".to_string());

    Ok(if env == "dev" {
        base_dir.join("intervalo-dev")
    } else {
        base_dir.join("intervalo")
    })
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, or defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.warning_seconds_before_end == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.warning_seconds_before_end".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.session.pre_countdown_seconds > MAX_PRE_COUNTDOWN_SECS {
            return Err(ConfigError::InvalidValue {
                key: "session.pre_countdown_seconds".into(),
                message: format!("must be at most {MAX_PRE_COUNTDOWN_SECS}"),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            pre_countdown_secs: self.session.pre_countdown_seconds,
            warning_secs_before_end: self.session.warning_seconds_before_end,
            enable_sounds: self.cues.enable_sounds,
            enable_vibration: self.cues.enable_vibration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.session.pre_countdown_seconds, 3);
        assert_eq!(cfg.session.warning_seconds_before_end, 10);
        assert!(cfg.cues.enable_sounds);
        assert!(cfg.cues.enable_vibration);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg = Config::from_toml_str("[cues]\nenable_sounds = false\n").unwrap();
        assert!(!cfg.cues.enable_sounds);
        assert!(cfg.cues.enable_vibration);
        assert_eq!(cfg.session.warning_seconds_before_end, 10);
    }

    #[test]
    fn zero_warning_is_rejected() {
        let err = Config::from_toml_str("[session]\nwarning_seconds_before_end = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn oversized_pre_countdown_is_rejected() {
        let err = Config::from_toml_str("[session]\npre_countdown_seconds = 600\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "session.pre_countdown_seconds"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = Config::from_toml_str("[session\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("cues.enable_sounds").as_deref(), Some("true"));
        assert_eq!(
            cfg.get("session.warning_seconds_before_end").as_deref(),
            Some("10")
        );
        assert!(cfg.get("session.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[session]\npre_countdown_seconds = 0\nwarning_seconds_before_end = 5\n",
        )
        .unwrap();
        let settings = Config::load_from(&path).unwrap().settings();
        assert_eq!(settings.pre_countdown_secs, 0);
        assert_eq!(settings.warning_secs_before_end, 5);
    }

    #[test]
    fn settings_project_cue_output() {
        let mut cfg = Config::default();
        cfg.cues.enable_sounds = false;
        let out = cfg.settings().cue_output();
        assert!(!out.sound);
        assert!(out.vibration);
        assert!(!out.is_silent());
    }
}
