//! GPX track library cleanup.
//!
//! Scans a directory for `.gpx` files and either checks that each filename
//! matches its contents (`YYYY-MM-DD NAME.gpx`) or rewrites each file down to
//! its essentials. Files that fail to parse are counted and skipped; they
//! never abort the scan.

pub mod analyze;
pub mod fix;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub use analyze::{FilenameWarning, GpxFileError, PointCounts, TrackInfo, analyze_file, check_filename};
pub use fix::{fix_file, simplify};

use crate::error::{HousekeepError, Result};

/// Flags of the `gpx` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackOptions {
    pub recursive: bool,
    pub fix: bool,
    pub count_points: bool,
    /// Print parse/fix error details.
    pub verbose: bool,
}

/// Totals of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackSummary {
    pub total: usize,
    pub analyzed: usize,
    pub fixed: usize,
    pub with_warnings: usize,
}

impl TrackSummary {
    pub fn failed(&self) -> usize {
        self.total - self.analyzed
    }
}

fn is_gpx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gpx"))
}

/// All GPX files under `dir`, sorted by path.
pub fn find_gpx_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        if entry.file_type().is_file() && is_gpx(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Run a check or fix pass over `dir`.
pub fn run(dir: &Path, options: TrackOptions) -> Result<TrackSummary> {
    if !dir.is_dir() {
        return Err(HousekeepError::usage(format!(
            "Directory not found at '{}'",
            dir.display()
        )));
    }

    println!("🔍 Scanning for GPX files in: {}", dir.display());
    if options.recursive {
        println!("📁 (including subdirectories)");
    }
    if options.fix {
        println!("🔧 Fix mode enabled - files will be simplified and track names updated");
    } else {
        println!("✅ Format checking enabled");
    }
    if options.count_points {
        println!("📊 Point counting enabled");
    }
    println!();

    let files = find_gpx_files(dir, options.recursive)?;
    let mut summary = TrackSummary {
        total: files.len(),
        ..Default::default()
    };
    if files.is_empty() {
        println!("🚫 No GPX files found in the specified directory.");
        return Ok(summary);
    }

    for path in &files {
        let info = match analyze_file(path) {
            Ok(info) => info,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                if options.verbose {
                    println!("!!! Error: {}: {}", file_label(path), e);
                }
                continue;
            }
        };
        summary.analyzed += 1;

        if options.fix {
            match fix_file(path) {
                Ok(()) => {
                    debug!("simplified {}", path.display());
                    println!("🔧 {}", info.filename);
                    summary.fixed += 1;
                }
                Err(e) => {
                    if options.verbose {
                        println!("!!! Error fixing {}: {}", info.filename, e);
                    }
                    println!("❌ {}", info.filename);
                }
            }
        } else {
            let warnings = check_filename(&info);
            if !warnings.is_empty() {
                summary.with_warnings += 1;
            }
            print_file_info(&info, &warnings, options.count_points);
        }
    }

    println!();
    if options.fix {
        println!(
            "📊 Summary: Successfully fixed {}/{} GPX files.",
            summary.fixed, summary.analyzed
        );
    } else {
        println!(
            "📊 Summary: Analyzed {}/{} GPX files successfully.",
            summary.analyzed, summary.total
        );
    }
    if summary.failed() > 0 {
        println!(
            "⚠️ Failed to parse {} file(s). Use -v for details.",
            summary.failed()
        );
    }

    Ok(summary)
}

/// One status line for a checked file, followed by its warnings.
pub fn format_file_info(info: &TrackInfo, warnings: &[FilenameWarning], count_points: bool) -> String {
    let status = if warnings.is_empty() { "✅" } else { "⚠️ " };
    let mut out = format!("{} {}", status, info.filename);
    if count_points {
        let c = info.counts;
        out.push_str(&format!(
            " (📍 {} track pts, 🎯 {} waypts, 🛤️  {} route pts)",
            c.track_points, c.waypoints, c.route_points
        ));
    }
    for warning in warnings {
        out.push_str(&format!("\n  {}", warning));
    }
    out
}

fn print_file_info(info: &TrackInfo, warnings: &[FilenameWarning], count_points: bool) {
    println!("{}", format_file_info(info, warnings, count_points));
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
