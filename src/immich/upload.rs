//! Upload a folder to Immich, retrying each file and optionally filing
//! uploads into an album.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::client::{AssetUpload, ImmichApi, UploadedAsset};
use super::{ImmichError, collect_media_files, progress_label, relative_display, validate_directory};
use crate::error::Result;

/// Retry schedule for a single upload.
///
/// Attempt `n` (0-based) waits `base_delay * n` before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Attempts actually made; at least one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Outcome of one upload run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: Vec<String>,
    /// Uploaded, but adding to the album failed
    pub album_warnings: Vec<String>,
    /// Relative path and last error
    pub failed: Vec<(String, String)>,
}

/// Immich timestamp format, always UTC with zero milliseconds.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%Y-%m-%dT%H:%M:%S.000Z")
        .to_string()
}

/// Build the multipart fields for `path`.
pub fn asset_upload(path: &Path, device_id: &str) -> std::io::Result<AssetUpload> {
    let metadata = fs::metadata(path)?;
    let modified = metadata.modified()?;
    let created = metadata.created().unwrap_or(modified);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(AssetUpload {
        path: path.to_path_buf(),
        device_asset_id: file_name,
        device_id: device_id.to_string(),
        file_created_at: format_timestamp(created),
        file_modified_at: format_timestamp(modified),
    })
}

/// Upload one file, retrying per `policy`. Returns the last error when every
/// attempt fails.
pub fn upload_with_retry<A: ImmichApi + ?Sized>(
    api: &A,
    upload: &AssetUpload,
    policy: RetryPolicy,
) -> std::result::Result<UploadedAsset, ImmichError> {
    let attempts = policy.attempts();
    let mut attempt = 0;
    loop {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        match api.upload_asset(upload) {
            Ok(asset) => return Ok(asset),
            Err(e) if attempt + 1 >= attempts => return Err(e),
            Err(e) => {
                warn!(
                    "upload of {} failed (attempt {}/{}): {}",
                    upload.path.display(),
                    attempt + 1,
                    attempts,
                    e
                );
            }
        }
        attempt += 1;
    }
}

/// Upload every supported file under `folder`.
pub fn run_upload<A: ImmichApi + ?Sized>(
    api: &A,
    folder: &Path,
    album: Option<&str>,
    device_id: &str,
    policy: RetryPolicy,
) -> Result<UploadSummary> {
    validate_directory(folder)?;
    let files = collect_media_files(folder)?;
    let total = files.len();
    let mut summary = UploadSummary::default();

    let album_text = album
        .map(|id| format!(" to album {}", id))
        .unwrap_or_default();
    println!(
        "📤 Uploading {} files from {} (recursive){}",
        total,
        folder.display(),
        album_text
    );
    println!("{}", "=".repeat(80));

    for (index, path) in files.iter().enumerate() {
        let relative = relative_display(path, folder);
        print!("{} {:<40} ", progress_label(index, total), relative);
        let _ = std::io::stdout().flush();

        let result = asset_upload(path, device_id)
            .map_err(ImmichError::from)
            .and_then(|upload| upload_with_retry(api, &upload, policy));

        match result {
            Ok(asset) => match (album, asset.id.as_deref()) {
                (Some(album_id), Some(asset_id)) => match api.add_to_album(album_id, asset_id) {
                    Ok(()) => {
                        println!("✅ Uploaded and added to album");
                        summary.uploaded.push(relative);
                    }
                    Err(e) => {
                        warn!("adding {} to album {} failed: {}", asset_id, album_id, e);
                        println!("⚠️ Uploaded but failed to add to album");
                        summary.album_warnings.push(relative);
                    }
                },
                _ => {
                    println!("✅ Uploaded successfully");
                    summary.uploaded.push(relative);
                }
            },
            Err(e) => {
                println!("{}", upload_failure_line(policy, &e));
                summary.failed.push((relative, e.to_string()));
            }
        }
    }

    println!("{}", "=".repeat(80));
    print_report(&summary);
    info!(
        "upload finished: {} uploaded, {} album warnings, {} failed",
        summary.uploaded.len(),
        summary.album_warnings.len(),
        summary.failed.len()
    );
    Ok(summary)
}

/// Status line for a file whose every upload attempt failed.
pub fn upload_failure_line(policy: RetryPolicy, error: &ImmichError) -> String {
    format!("❌ Failed after {} attempts: {}", policy.attempts(), error)
}

fn print_report(summary: &UploadSummary) {
    if !summary.uploaded.is_empty() {
        println!("✅ Successfully uploaded {} files:", summary.uploaded.len());
        for name in &summary.uploaded {
            println!("   • {}", name);
        }
    }
    if !summary.album_warnings.is_empty() {
        println!(
            "⚠️  Uploaded but failed to add to album {} files:",
            summary.album_warnings.len()
        );
        for name in &summary.album_warnings {
            println!("   • {}", name);
        }
    }
    if !summary.failed.is_empty() {
        println!("\n❌ Failed to upload {} files:", summary.failed.len());
        for (name, error) in &summary.failed {
            println!("   • {}: {}", name, error);
        }
    }
    if summary.uploaded.is_empty() && summary.failed.is_empty() && summary.album_warnings.is_empty() {
        println!("ℹ️  No supported files found to upload");
    }
    println!(
        "📊 Summary: {} files uploaded, {} files failed",
        summary.uploaded.len(),
        summary.failed.len()
    );
}
