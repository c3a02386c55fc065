//! Core error types for intervalo-core.
//!
//! The engine has exactly one failure (`InvalidPlan`); every other engine
//! call is total. Alert scheduling failures are reported separately and
//! never interrupt a running session.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for intervalo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A session cannot start because the plan has no segments.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// The host alert capability refused or failed to schedule alerts.
    /// Playback continues; only background alerts are missing.
    #[error("Alert capability unavailable: {0}")]
    AlertCapabilityUnavailable(#[from] AlertHostError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by a host alert capability.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertHostError {
    /// The user or OS has not granted notification permission.
    #[error("notification permission denied")]
    PermissionDenied,

    /// Cancelling the previously registered alerts failed.
    #[error("failed to cancel registered alerts: {0}")]
    CancelFailed(String),

    /// Registering a single alert failed.
    #[error("failed to register alert: {0}")]
    RegisterFailed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Home/config directory could not be determined or created.
    #[error("Configuration directory unavailable: {0}")]
    DirUnavailable(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_converts_into_capability_unavailable() {
        let err: CoreError = AlertHostError::PermissionDenied.into();
        assert!(matches!(err, CoreError::AlertCapabilityUnavailable(_)));
        assert_eq!(
            err.to_string(),
            "Alert capability unavailable: notification permission denied"
        );
    }

    #[test]
    fn invalid_plan_message() {
        let err = CoreError::InvalidPlan("plan has no segments".into());
        assert_eq!(err.to_string(), "Invalid plan: plan has no segments");
    }
}
