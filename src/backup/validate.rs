//! Argument and precondition checks for a backup run.
//!
//! Runs before any external state is touched. Order matters: the source
//! directory is checked before privilege, and privilege before the password
//! prompt.

use std::path::{Path, PathBuf};

use super::BackupError;

/// A backup invocation whose preconditions hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRequest {
    source: PathBuf,
    repository: String,
}

impl BackupRequest {
    /// Check that `source` is an existing directory, `repository` is not
    /// empty, and the process is `privileged`.
    ///
    /// Privilege is required because a system-wide backup reads files the
    /// invoking user may not be able to read.
    pub fn validate(
        source: &Path,
        repository: &str,
        privileged: bool,
    ) -> Result<Self, BackupError> {
        if !source.exists() {
            return Err(BackupError::SourceMissing(source.to_path_buf()));
        }
        if !source.is_dir() {
            return Err(BackupError::SourceNotDirectory(source.to_path_buf()));
        }
        if repository.trim().is_empty() {
            return Err(BackupError::EmptyRepository);
        }
        if !privileged {
            return Err(BackupError::NotPrivileged);
        }

        Ok(Self {
            source: source.to_path_buf(),
            repository: repository.to_string(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let dir = tempfile::tempdir().unwrap();
        let request = BackupRequest::validate(dir.path(), "/srv/restic", true).unwrap();
        assert_eq!(request.source(), dir.path());
        assert_eq!(request.repository(), "/srv/restic");
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = BackupRequest::validate(&missing, "repo", true).unwrap_err();
        assert!(matches!(err, BackupError::SourceMissing(_)));
    }

    #[test]
    fn test_source_is_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        let err = BackupRequest::validate(&file, "repo", true).unwrap_err();
        assert!(matches!(err, BackupError::SourceNotDirectory(_)));
    }

    #[test]
    fn test_directory_checked_before_privilege() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = BackupRequest::validate(&missing, "repo", false).unwrap_err();
        assert!(matches!(err, BackupError::SourceMissing(_)));
    }

    #[test]
    fn test_unprivileged_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = BackupRequest::validate(dir.path(), "repo", false).unwrap_err();
        assert!(matches!(err, BackupError::NotPrivileged));
    }

    #[test]
    fn test_blank_repository_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = BackupRequest::validate(dir.path(), "  ", true).unwrap_err();
        assert!(matches!(err, BackupError::EmptyRepository));
    }
}
