//! Find local files that already exist in Immich, by SHA-1 checksum, and
//! optionally delete them.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use sha1::{Digest, Sha1};
use tracing::{info, warn};

use super::client::{ImmichApi, SearchResult};
use super::{collect_media_files, progress_label, relative_display, validate_directory};
use crate::error::Result;

/// Outcome of one check run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub total: usize,
    /// Found in Immich but kept (check-only mode)
    pub found: Vec<String>,
    /// Found in Immich and deleted locally
    pub deleted: Vec<String>,
}

/// Hex SHA-1 of a file, as Immich stores asset checksums.
pub fn sha1_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn search<A: ImmichApi + ?Sized>(api: &A, checksum: &str) -> SearchResult {
    api.search_checksum(checksum).unwrap_or_else(|e| {
        println!("Search API error: {}", e);
        SearchResult::default()
    })
}

fn album_names<A: ImmichApi + ?Sized>(api: &A, asset_id: &str) -> Vec<String> {
    match api.asset_albums(asset_id) {
        Ok(albums) => albums.into_iter().map(|a| a.album_name).collect(),
        Err(e) => {
            println!("Albums API error: {}", e);
            Vec::new()
        }
    }
}

/// Check every supported file under `folder`; with `delete`, remove the ones
/// Immich already has.
///
/// A file counts as uploaded only when the search returns exactly one asset
/// with an id. Multiple matches are kept.
pub fn run_check<A: ImmichApi + ?Sized>(api: &A, folder: &Path, delete: bool) -> Result<CheckSummary> {
    validate_directory(folder)?;
    let files = collect_media_files(folder)?;
    let mut summary = CheckSummary {
        total: files.len(),
        ..Default::default()
    };

    let mode = if delete {
        " (will delete duplicates)"
    } else {
        " (check only)"
    };
    println!(
        "🔍 Checking {} files in {} (recursive){}",
        summary.total,
        folder.display(),
        mode
    );
    println!("{}", "=".repeat(80));

    for (index, path) in files.iter().enumerate() {
        let relative = relative_display(path, folder);
        print!("{} {:<40} ", progress_label(index, summary.total), relative);
        let _ = io::stdout().flush();

        let checksum = match sha1_file(path) {
            Ok(checksum) => checksum,
            Err(e) => {
                println!("⚠️ Failed to read file: {} - keeping file", e);
                continue;
            }
        };

        let result = search(api, &checksum);
        if result.count == 0 {
            println!("❌ Not found - keeping file");
            continue;
        }
        if result.count > 1 {
            println!("⚠️ Multiple results found - keeping file");
            continue;
        }
        let Some(asset_id) = result.items.first().and_then(|a| a.id.clone()) else {
            println!("⚠️ Result missing asset id - keeping file");
            continue;
        };

        let albums = album_names(api, &asset_id);
        let albums_text = if albums.is_empty() {
            "No albums".to_string()
        } else {
            albums.join(", ")
        };

        if delete {
            println!("✅ Found in [{}] - deleting", albums_text);
            match fs::remove_file(path) {
                Ok(()) => summary.deleted.push(relative),
                Err(e) => {
                    warn!("failed to delete {}: {}", path.display(), e);
                    println!("⚠️ Failed to delete: {}", e);
                }
            }
        } else {
            println!("✅ Found in [{}] - would delete", albums_text);
            summary.found.push(relative);
        }
    }

    println!("{}", "=".repeat(80));
    print_report(&summary, delete);
    info!(
        "check finished: {} files, {} found, {} deleted",
        summary.total,
        summary.found.len(),
        summary.deleted.len()
    );
    Ok(summary)
}

fn print_report(summary: &CheckSummary, delete: bool) {
    if delete {
        if summary.deleted.is_empty() {
            println!("ℹ️  No files were deleted - all files are unique or not found");
        } else {
            println!(
                "🗑️  Deleted {} files that were already uploaded:",
                summary.deleted.len()
            );
            for name in &summary.deleted {
                println!("   • {}", name);
            }
        }
        println!(
            "📊 Summary: {} files kept, {} files deleted",
            summary.total - summary.deleted.len(),
            summary.deleted.len()
        );
    } else {
        if summary.found.is_empty() {
            println!("ℹ️  No duplicate files found");
        } else {
            println!(
                "📋 Found {} files that are already uploaded:",
                summary.found.len()
            );
            for name in &summary.found {
                println!("   • {}", name);
            }
        }
        println!(
            "📊 Summary: {} files would be kept, {} files would be deleted",
            summary.total - summary.found.len(),
            summary.found.len()
        );
    }
}
