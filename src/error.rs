// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Custom error system for Riptide
#[derive(Error, Debug)]
pub enum RiptideError {
    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Duplicate plugin name: {0}")]
    DuplicatePluginName(String),

    #[error("Plugin execution error on '{name}': {cause}")]
    PluginExecutionFailed { name: String, cause: String },

    #[error("Plugin '{name}' exceeded the {limit_secs} second execution timeout")]
    TimeoutExceeded { name: String, limit_secs: u64 },

    #[error("Scan workflow failed in {phase} phase: {reason}")]
    ScanWorkflowFailure { phase: String, reason: String },

    #[error("Invalid argument {flag}: {reason}")]
    InvalidArgument { flag: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("File error: {path:?} - {message}")]
    FileError { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

// Type alias for Riptide results
pub type RiptideResult<T> = std::result::Result<T, RiptideError>;

impl RiptideError {
    /// Wrap an error as a plugin execution failure unless it already
    /// carries plugin execution context.
    pub fn into_execution_failure(self, plugin_name: &str) -> Self {
        match self {
            RiptideError::PluginExecutionFailed { .. } | RiptideError::TimeoutExceeded { .. } => {
                self
            }
            other => RiptideError::PluginExecutionFailed {
                name: plugin_name.to_string(),
                cause: other.to_string(),
            },
        }
    }
}

// Conversion from anyhow to RiptideError
impl From<anyhow::Error> for RiptideError {
    fn from(error: anyhow::Error) -> Self {
        RiptideError::Unexpected(error.to_string())
    }
}

// Conversion from std::io::Error to RiptideError
impl From<std::io::Error> for RiptideError {
    fn from(error: std::io::Error) -> Self {
        RiptideError::FileError {
            path: PathBuf::from("unknown"),
            message: error.to_string(),
        }
    }
}

// Conversion from reqwest::Error to RiptideError
impl From<reqwest::Error> for RiptideError {
    fn from(error: reqwest::Error) -> Self {
        RiptideError::NetworkError(error.to_string())
    }
}

// Conversion from serde_json::Error to RiptideError
impl From<serde_json::Error> for RiptideError {
    fn from(error: serde_json::Error) -> Self {
        RiptideError::SerializationError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_execution_failure_wraps_plain_errors() {
        let err = RiptideError::NetworkError("connection refused".to_string());
        match err.into_execution_failure("FakeDetector") {
            RiptideError::PluginExecutionFailed { name, cause } => {
                assert_eq!(name, "FakeDetector");
                assert!(cause.contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn into_execution_failure_keeps_existing_execution_errors() {
        let err = RiptideError::TimeoutExceeded {
            name: "SlowDetector".to_string(),
            limit_secs: 3600,
        };
        match err.into_execution_failure("Other") {
            RiptideError::TimeoutExceeded { name, .. } => assert_eq!(name, "SlowDetector"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
