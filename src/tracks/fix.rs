//! Rewriting GPX files down to their essentials.
//!
//! Kept: metadata time, track and route names, segments, and per point the
//! position, elevation and (for track points) time. Everything else, waypoints
//! included, is dropped. When the filename follows `YYYY-MM-DD NAME`, NAME
//! replaces every track and route name.

use std::fs;
use std::path::Path;

use gpx::{Gpx, GpxVersion, Metadata, Route, Track, TrackSegment, Waypoint};

use super::analyze::{GpxFileError, parse_filename, read_gpx};

/// Creator written into simplified files.
const CREATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Build the simplified copy of `gpx`.
pub fn simplify(gpx: &Gpx, name_override: Option<&str>) -> Gpx {
    let mut out = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.to_string()),
        ..Default::default()
    };

    if let Some(time) = gpx.metadata.as_ref().and_then(|m| m.time.clone()) {
        out.metadata = Some(Metadata {
            time: Some(time),
            ..Default::default()
        });
    }

    for track in &gpx.tracks {
        let mut new_track = Track::new();
        new_track.name = pick_name(name_override, track.name.as_ref());
        for segment in &track.segments {
            let mut new_segment = TrackSegment::new();
            new_segment
                .points
                .extend(segment.points.iter().map(|p| essential_point(p, true)));
            new_track.segments.push(new_segment);
        }
        out.tracks.push(new_track);
    }

    for route in &gpx.routes {
        let mut new_route = Route::new();
        new_route.name = pick_name(name_override, route.name.as_ref());
        new_route
            .points
            .extend(route.points.iter().map(|p| essential_point(p, false)));
        out.routes.push(new_route);
    }

    out
}

/// Simplify the file at `path` in place.
///
/// The new document is fully serialized before the file is touched, so a
/// write error never leaves a truncated file.
pub fn fix_file(path: &Path) -> Result<(), GpxFileError> {
    let gpx = read_gpx(path)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name_override = parse_filename(&stem).map(|(_, name)| name);

    let simplified = simplify(&gpx, name_override);
    let mut buffer = Vec::new();
    gpx::write(&simplified, &mut buffer).map_err(|e| GpxFileError::Write(e.to_string()))?;
    fs::write(path, buffer)?;
    Ok(())
}

fn pick_name(name_override: Option<&str>, original: Option<&String>) -> Option<String> {
    match name_override {
        Some(name) => Some(name.to_string()),
        None => original.filter(|n| !n.is_empty()).cloned(),
    }
}

fn essential_point(point: &Waypoint, keep_time: bool) -> Waypoint {
    let mut out = Waypoint::new(point.point());
    out.elevation = point.elevation;
    if keep_time {
        out.time = point.time.clone();
    }
    out
}
