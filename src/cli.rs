use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::convert::ConvertMode;

/// housekeep - household automation chores
#[derive(Parser, Debug)]
#[command(name = "housekeep")]
#[command(about = "Restic backups, ffmpeg batch conversion, GPX cleanup and Immich uploads")]
#[command(version)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); also prints per-file
    /// error details for `gpx`
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Back up a local directory to a restic repository, prune and verify
    ///
    /// Requires root. The repository password is prompted for on the terminal.
    Backup {
        /// Directory to back up
        #[arg(value_name = "LOCAL_DIR")]
        source: PathBuf,
        /// Restic repository location (e.g. sftp:host:/srv/restic)
        repository: String,
    },
    /// Batch-convert videos in a directory with ffmpeg
    Convert {
        /// Conversion to perform
        #[arg(value_enum)]
        mode: ConvertMode,
        /// Directory containing the source files (not recursive)
        directory: PathBuf,
    },
    /// Check GPX filenames against their contents, or rewrite them
    Gpx {
        /// Directory to scan
        #[arg(default_value = ".")]
        directory: PathBuf,
        /// Include subdirectories
        #[arg(short, long)]
        recursive: bool,
        /// Rewrite each file keeping only tracks, routes and timestamps
        #[arg(short, long)]
        fix: bool,
        /// Count track, route and waypoint points
        #[arg(short = 'c', long)]
        count_points: bool,
    },
    /// Immich photo library tools
    Immich {
        #[command(subcommand)]
        action: ImmichCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ImmichCommands {
    /// Upload all supported media in a folder (recursive)
    Upload {
        /// Folder to upload
        folder: PathBuf,
        /// Album id to add every uploaded asset to
        #[arg(short, long, value_name = "ALBUM_ID")]
        album: Option<String>,
    },
    /// Find local files already present in Immich
    Check {
        /// Folder to check
        folder: PathBuf,
        /// Delete local files that are already uploaded
        #[arg(short, long)]
        delete: bool,
    },
}
