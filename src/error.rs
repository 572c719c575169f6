//! Error handling module for housekeep
//!
//! Provides the crate-wide error type using thiserror. Each command keeps its
//! own narrower error enum (`BackupError`, `ImmichError`, ...) and converts
//! into `HousekeepError` at the command boundary.

use thiserror::Error;

use crate::backup::BackupError;
use crate::immich::ImmichError;

/// Main error type for housekeep
#[derive(Error, Debug)]
pub enum HousekeepError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, parsing, missing credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Usage errors detected before any external call
    #[error("{0}")]
    Usage(String),

    /// Required external binary is not installed
    #[error("Required tool '{binary}' not found (install: {package})")]
    MissingTool { binary: String, package: String },

    /// Backup pipeline errors
    #[error(transparent)]
    Backup(#[from] BackupError),

    /// Immich API errors that abort a whole command
    #[error(transparent)]
    Immich(#[from] ImmichError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from glue code using anyhow
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for housekeep operations
pub type Result<T> = std::result::Result<T, HousekeepError>;

impl HousekeepError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HousekeepError::config("IMMICH_URL is not set");
        assert_eq!(err.to_string(), "Configuration error: IMMICH_URL is not set");

        let err = HousekeepError::usage("Directory ./missing does not exist");
        assert_eq!(err.to_string(), "Directory ./missing does not exist");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HousekeepError = io_err.into();
        assert!(matches!(err, HousekeepError::Io(_)));
    }

    #[test]
    fn test_backup_error_is_transparent() {
        let err: HousekeepError = BackupError::NotPrivileged.into();
        assert_eq!(err.to_string(), BackupError::NotPrivileged.to_string());
    }

    #[test]
    fn test_missing_tool_message() {
        let err = HousekeepError::MissingTool {
            binary: "restic".to_string(),
            package: "restic".to_string(),
        };
        assert!(err.to_string().contains("'restic' not found"));
    }
}
