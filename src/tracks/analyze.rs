//! Reading GPX files and checking their names.
//!
//! Files are expected to be named `YYYY-MM-DD NAME.gpx`, where the date is
//! the day the track was recorded and NAME matches the first track's name.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use gpx::Gpx;
use regex::Regex;
use thiserror::Error;
use time::OffsetDateTime;

static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(.+)$").expect("INTERNAL ERROR: filename pattern is valid")
});

/// Errors reading or writing a single GPX file.
#[derive(Error, Debug)]
pub enum GpxFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted or invalid GPX format: {0}")]
    Parse(String),

    #[error("failed to write GPX: {0}")]
    Write(String),
}

/// Number of points per kind in one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointCounts {
    pub track_points: usize,
    pub waypoints: usize,
    pub route_points: usize,
}

/// Key facts about one GPX file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub path: PathBuf,
    pub filename: String,
    /// GPX creator, else metadata author name.
    pub creator: Option<String>,
    /// First track name, else first route name.
    pub track_name: Option<String>,
    /// `YYYY-MM-DD` of the first timed track point, else metadata time.
    pub date: Option<String>,
    pub counts: PointCounts,
}

impl TrackInfo {
    pub fn creator_label(&self) -> &str {
        self.creator.as_deref().unwrap_or("Not specified")
    }

    pub fn track_name_label(&self) -> &str {
        self.track_name.as_deref().unwrap_or("No track name found")
    }

    pub fn date_label(&self) -> &str {
        self.date.as_deref().unwrap_or("No date found")
    }
}

/// Problem found by `check_filename`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameWarning {
    InvalidFormat,
    DateMismatch,
    TrackNameMismatch,
}

impl fmt::Display for FilenameWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilenameWarning::InvalidFormat => f.write_str("📝 Invalid filename format"),
            FilenameWarning::DateMismatch => f.write_str("📅 Date mismatch"),
            FilenameWarning::TrackNameMismatch => f.write_str("🏷️ Track name mismatch"),
        }
    }
}

/// Split a file stem into `(date, name)` when it follows `YYYY-MM-DD NAME`.
pub fn parse_filename(stem: &str) -> Option<(&str, &str)> {
    let captures = FILENAME_PATTERN.captures(stem)?;
    let date = captures.get(1)?.as_str();
    let name = captures.get(2)?.as_str();
    Some((date, name))
}

/// Parse a GPX file from disk.
pub fn read_gpx(path: &Path) -> Result<Gpx, GpxFileError> {
    let file = File::open(path)?;
    gpx::read(BufReader::new(file)).map_err(|e| GpxFileError::Parse(e.to_string()))
}

/// Parse `path` and extract its `TrackInfo`.
pub fn analyze_file(path: &Path) -> Result<TrackInfo, GpxFileError> {
    let gpx = read_gpx(path)?;
    Ok(track_info(path, &gpx))
}

/// Extract `TrackInfo` from an already parsed document.
pub fn track_info(path: &Path, gpx: &Gpx) -> TrackInfo {
    TrackInfo {
        path: path.to_path_buf(),
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        creator: creator(gpx),
        track_name: track_name(gpx),
        date: date(gpx),
        counts: count_points(gpx),
    }
}

/// Compare the filename against the file contents.
///
/// Mismatches are only reported for values actually present in the file.
pub fn check_filename(info: &TrackInfo) -> Vec<FilenameWarning> {
    let stem = Path::new(&info.filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some((file_date, file_name)) = parse_filename(&stem) else {
        return vec![FilenameWarning::InvalidFormat];
    };

    let mut warnings = Vec::new();
    if info.date.as_deref().is_some_and(|d| d != file_date) {
        warnings.push(FilenameWarning::DateMismatch);
    }
    if info.track_name.as_deref().is_some_and(|n| n != file_name) {
        warnings.push(FilenameWarning::TrackNameMismatch);
    }
    warnings
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}

fn creator(gpx: &Gpx) -> Option<String> {
    non_empty(gpx.creator.as_ref()).or_else(|| {
        let author = gpx.metadata.as_ref()?.author.as_ref()?;
        non_empty(author.name.as_ref())
    })
}

fn track_name(gpx: &Gpx) -> Option<String> {
    non_empty(gpx.tracks.first().and_then(|t| t.name.as_ref()))
        .or_else(|| non_empty(gpx.routes.first().and_then(|r| r.name.as_ref())))
}

fn date(gpx: &Gpx) -> Option<String> {
    let first_point_time = gpx
        .tracks
        .iter()
        .flat_map(|t| t.segments.iter())
        .flat_map(|s| s.points.iter())
        .find_map(|p| p.time.clone());

    first_point_time
        .or_else(|| gpx.metadata.as_ref().and_then(|m| m.time.clone()))
        .map(|t| format_date(OffsetDateTime::from(t)))
}

fn format_date(dt: OffsetDateTime) -> String {
    format!("{:04}-{:02}-{:02}", dt.year(), u8::from(dt.month()), dt.day())
}

fn count_points(gpx: &Gpx) -> PointCounts {
    PointCounts {
        track_points: gpx
            .tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .map(|s| s.points.len())
            .sum(),
        waypoints: gpx.waypoints.len(),
        route_points: gpx.routes.iter().map(|r| r.points.len()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(filename: &str, date: Option<&str>, track_name: Option<&str>) -> TrackInfo {
        TrackInfo {
            path: PathBuf::from(filename),
            filename: filename.to_string(),
            creator: None,
            track_name: track_name.map(str::to_string),
            date: date.map(str::to_string),
            counts: PointCounts::default(),
        }
    }

    #[test]
    fn test_parse_filename() {
        assert_eq!(
            parse_filename("2024-05-01 Morning Ride"),
            Some(("2024-05-01", "Morning Ride"))
        );
        assert_eq!(parse_filename("Morning Ride"), None);
        assert_eq!(parse_filename("2024-05-01"), None);
        assert_eq!(parse_filename("2024-5-1 Ride"), None);
    }

    #[test]
    fn test_check_filename_ok() {
        let i = info("2024-05-01 Ride.gpx", Some("2024-05-01"), Some("Ride"));
        assert!(check_filename(&i).is_empty());
    }

    #[test]
    fn test_check_filename_invalid_format_only() {
        let i = info("ride.gpx", Some("2024-05-01"), Some("Other"));
        assert_eq!(check_filename(&i), vec![FilenameWarning::InvalidFormat]);
    }

    #[test]
    fn test_check_filename_mismatches() {
        let i = info("2024-05-01 Ride.gpx", Some("2024-05-02"), Some("Hike"));
        assert_eq!(
            check_filename(&i),
            vec![FilenameWarning::DateMismatch, FilenameWarning::TrackNameMismatch]
        );
    }

    #[test]
    fn test_missing_values_do_not_warn() {
        let i = info("2024-05-01 Ride.gpx", None, None);
        assert!(check_filename(&i).is_empty());
    }

    #[test]
    fn test_labels_fall_back() {
        let i = info("x.gpx", None, None);
        assert_eq!(i.creator_label(), "Not specified");
        assert_eq!(i.track_name_label(), "No track name found");
        assert_eq!(i.date_label(), "No date found");
    }
}
