//! Immich photo library commands: upload a folder, or find local files that
//! are already in the library.
//!
//! Both walk the folder recursively in sorted order and only consider
//! supported image/video extensions. Per-file failures are reported and the
//! walk continues.

pub mod check;
pub mod client;
pub mod upload;

use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;
use walkdir::WalkDir;

pub use check::{CheckSummary, run_check};
pub use client::{Album, AssetUpload, ImmichApi, ImmichClient, SearchResult, UploadedAsset};
pub use upload::{RetryPolicy, UploadSummary, run_upload};

use crate::error::{HousekeepError, Result};

/// Extensions Immich accepts, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp",
    // videos
    "mp4", "avi", "mov", "mkv", "webm", "m4v", "3gp",
];

/// Errors talking to the Immich server.
#[derive(Error, Debug)]
pub enum ImmichError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Immich returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Fail with a usage error unless `folder` is an existing directory.
pub fn validate_directory(folder: &Path) -> Result<()> {
    if !folder.exists() {
        return Err(HousekeepError::usage(format!(
            "Directory {} does not exist.",
            folder.display()
        )));
    }
    if !folder.is_dir() {
        return Err(HousekeepError::usage(format!(
            "Path {} exists but is not a directory.",
            folder.display()
        )));
    }
    Ok(())
}

/// Supported media files under `folder`, recursively, sorted.
pub fn collect_media_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", folder.display()))?;
        if entry.file_type().is_file() && is_supported(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// `path` relative to `base` for display.
pub(crate) fn relative_display(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// `[ 3/12]` style counter, padded to the width of `total`.
pub(crate) fn progress_label(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("[{:>width$}/{}]", index + 1, total, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_supported_case_insensitive() {
        assert!(is_supported(Path::new("a.JPG")));
        assert!(is_supported(Path::new("clip.3gp")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("README")));
    }

    #[test]
    fn test_collect_media_files_recursive_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b").join("2.png"), "").unwrap();
        fs::write(dir.path().join("a.jpg"), "").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();

        let files = collect_media_files(dir.path()).unwrap();
        let rel: Vec<_> = files.iter().map(|f| relative_display(f, dir.path())).collect();
        assert_eq!(rel, vec!["a.jpg".to_string(), format!("b{}2.png", std::path::MAIN_SEPARATOR)]);
    }

    #[test]
    fn test_validate_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_directory(dir.path()).is_ok());

        let file = dir.path().join("x.jpg");
        fs::write(&file, "").unwrap();
        let err = validate_directory(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));

        let err = validate_directory(&dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_progress_label_padding() {
        assert_eq!(progress_label(0, 12), "[ 1/12]");
        assert_eq!(progress_label(11, 12), "[12/12]");
    }
}
