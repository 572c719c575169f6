//! Batch media conversion with ffmpeg.
//!
//! Converts every file of the mode's source extension in one directory
//! (non-recursive). A failing file is reported and skipped; the batch always
//! runs to the end and the command exits 0. This is intentionally looser than
//! the backup pipeline, which stops at the first failure.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use strum::{Display, EnumIter, EnumString};
use tracing::{info, warn};

use crate::command_runner::{CommandRunner, run_tool};
use crate::error::{HousekeepError, Result};
use crate::tools::ffmpeg::FfmpegArgs;

/// Conversion preset: source extension, target extension, codec settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ConvertMode {
    /// MP4 to DNxHR HQ MOV with PCM audio (editing-friendly)
    Mp4ToMov,
    /// MOV to H.264/AAC MP4 (sharing-friendly)
    MovToMp4,
    /// MKV to MP4 without re-encoding
    MkvToMp4,
}

impl ConvertMode {
    pub const fn source_extension(self) -> &'static str {
        match self {
            ConvertMode::Mp4ToMov => "mp4",
            ConvertMode::MovToMp4 => "mov",
            ConvertMode::MkvToMp4 => "mkv",
        }
    }

    pub const fn target_extension(self) -> &'static str {
        match self {
            ConvertMode::Mp4ToMov => "mov",
            ConvertMode::MovToMp4 | ConvertMode::MkvToMp4 => "mp4",
        }
    }

    /// ffmpeg codec arguments placed between input and output.
    pub const fn codec_args(self) -> &'static [&'static str] {
        match self {
            ConvertMode::Mp4ToMov => &[
                "-c:v", "dnxhd", "-profile:v", "dnxhr_hq", "-pix_fmt", "yuv422p", "-c:a",
                "pcm_s16le",
            ],
            ConvertMode::MovToMp4 => &[
                "-c:v", "libx264", "-preset", "slow", "-crf", "18", "-pix_fmt", "yuv420p", "-c:a",
                "aac", "-b:a", "192k", "-movflags", "+faststart",
            ],
            ConvertMode::MkvToMp4 => &["-c", "copy", "-movflags", "+faststart"],
        }
    }

    /// Output path next to `input` with the target extension.
    pub fn output_path(self, input: &Path) -> PathBuf {
        input.with_extension(self.target_extension())
    }
}

/// Outcome of one batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl ConversionSummary {
    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Regular files in `dir` (not its subdirectories) with the mode's source
/// extension, compared case-insensitively, sorted by path.
pub fn find_sources(dir: &Path, mode: ConvertMode) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(mode.source_extension()));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert every matching file in `dir`, continuing past failures.
pub fn convert_directory<R: CommandRunner>(
    runner: &R,
    ffmpeg: &str,
    dir: &Path,
    mode: ConvertMode,
) -> Result<ConversionSummary> {
    if !dir.is_dir() {
        return Err(HousekeepError::usage(format!(
            "Directory {} does not exist or is not a directory",
            dir.display()
        )));
    }

    let sources = find_sources(dir, mode)?;
    let mut summary = ConversionSummary::default();
    if sources.is_empty() {
        println!(
            "🚫 No .{} files found in {}",
            mode.source_extension(),
            dir.display()
        );
        return Ok(summary);
    }

    println!(
        "🎬 Converting {} file(s) in {} ({})",
        sources.len(),
        dir.display(),
        mode
    );

    for input in sources {
        let output = mode.output_path(&input);
        let args = FfmpegArgs {
            binary: ffmpeg.to_string(),
            input: input.clone(),
            output: output.clone(),
            mode,
        };
        // A failure must not take an earlier file at the target path with it
        let existed_before = output.exists();

        let detail = match run_tool(runner, &args) {
            Ok(result) if result.success => None,
            Ok(result) => Some(result.failure_detail()),
            Err(e) => Some(format!("{:#}", e)),
        };

        match detail {
            None => {
                println!("{}", success_line(&input, &output));
                summary.converted.push(input);
            }
            Some(detail) => {
                eprintln!("{}", failure_line(&input, &detail));
                warn!("conversion of {} failed: {}", input.display(), detail);
                if !existed_before {
                    remove_partial_output(&output);
                }
                summary.failed.push(input);
            }
        }
    }

    info!(
        "conversion batch finished: {} converted, {} failed",
        summary.converted.len(),
        summary.failed.len()
    );
    println!("Conversion complete");
    Ok(summary)
}

/// Line printed to stdout for a converted file.
pub fn success_line(input: &Path, output: &Path) -> String {
    format!(
        "✅ Successfully converted {} -> {}",
        display_name(input),
        display_name(output)
    )
}

/// Line printed to stderr for a file that failed.
pub fn failure_line(input: &Path, detail: &str) -> String {
    format!("❌ Error converting {}: {}", display_name(input), detail)
}

/// ffmpeg may leave a truncated file behind when it fails mid-way.
fn remove_partial_output(output: &Path) {
    if output.exists() {
        if let Err(e) = fs::remove_file(output) {
            warn!("Failed to remove partial output {}: {}", output.display(), e);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
