//! Error types for arun

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using RunError
pub type Result<T> = std::result::Result<T, RunError>;

/// Errors raised while preparing, pushing or running an artifact
#[derive(Debug, Error)]
pub enum RunError {
    /// Local file missing or unreadable during classification
    #[error("Cannot read {path}")]
    NotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither magic signature matched
    #[error("{path} is not an ELF executable or a zip archive")]
    NotExecutableOrArchive { path: PathBuf },

    /// Archive target with no forwarded argument to use as the entry class
    #[error("No main class specified for archive target")]
    NoEntryPointSpecified,

    /// Absolute path resolution failed
    #[error("Failed to resolve absolute path for {path}")]
    PathResolutionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bridge push returned non-zero or could not start
    #[error("Failed to push {path} to device: {reason}")]
    TransferFailed { path: PathBuf, reason: String },

    /// Bridge shell returned non-zero or could not start
    #[error("Remote execution failed: {reason}")]
    ExecutionFailed { code: Option<i32>, reason: String },

    /// Bridge executable could not be located
    #[error("Bridge executable '{program}' not found. Install the Android platform tools or pass --adb")]
    BridgeNotFound { program: String },

    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotAccessible { .. } => 2,
            Self::NotExecutableOrArchive { .. } => 2,
            Self::NoEntryPointSpecified => 2,
            Self::PathResolutionFailed { .. } => 2,
            Self::Config(_) => 3,
            Self::BridgeNotFound { .. } => 4,
            Self::TransferFailed { .. } => 5,
            Self::ExecutionFailed { code, .. } => match code {
                Some(code) if *code != 0 => *code,
                _ => 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_failed_mirrors_bridge_code() {
        let err = RunError::ExecutionFailed {
            code: Some(42),
            reason: "adb exited with status 42".to_string(),
        };
        assert_eq!(err.exit_code(), 42);
    }

    #[test]
    fn test_execution_failed_without_code() {
        let err = RunError::ExecutionFailed {
            code: None,
            reason: "terminated by signal".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_target_errors_share_a_code() {
        assert_eq!(RunError::NoEntryPointSpecified.exit_code(), 2);
        assert_eq!(
            RunError::NotExecutableOrArchive {
                path: PathBuf::from("a.txt")
            }
            .exit_code(),
            2
        );
        assert_eq!(
            RunError::TransferFailed {
                path: PathBuf::from("a"),
                reason: "x".to_string()
            }
            .exit_code(),
            5
        );
    }
}
