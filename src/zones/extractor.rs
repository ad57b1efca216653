use std::fs;
use std::path::Path;

use geo_types::Point;
use rstar::RTree;
use serde_json::{json, Value};

use crate::lines::aggregator::sanitize_name;
use crate::lines::geojson::convert_to_geojson;

use super::catalog::{Direction, SegmentSpec, ZoneCatalog};
use super::error::Error;
use super::geo_util::{self, VertexNode};
use super::stations::StationIndex;

/// Property tag carried by every zone feature.
pub const ZONE_TYPE: &str = "Reduced Speed Zone";

/// Stations sit slightly off the track centerline; a nearest vertex farther
/// than this means the station is not on this line at all.
pub const MAX_SNAP_METERS: f64 = 500.0;

/// File holding a line's geometry, by the exporter's naming convention:
/// "Line 1" -> line1.json.
pub fn line_file_name(line: &str) -> String {
    let name = line.trim();
    let stripped = name.strip_prefix("Line").map(str::trim).unwrap_or(name);
    format!("line{}.json", sanitize_name(stripped))
}

/// Pull the working coordinates out of a line file: the first LineString
/// feature of a collection, or a single bare LineString feature.
pub fn load_line_coords(path: &Path) -> Result<Vec<[f64; 2]>, Error> {
    let raw = fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&raw)?;
    match doc.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => doc
            .get("features")
            .and_then(Value::as_array)
            .and_then(|features| features.iter().find_map(feature_line_coords))
            .ok_or_else(|| Error::NoLineGeometry(path.display().to_string())),
        Some("Feature") => feature_line_coords(&doc)
            .ok_or_else(|| Error::NoLineGeometry(path.display().to_string())),
        _ => Err(Error::UnexpectedStructure(path.display().to_string())),
    }
}

fn feature_line_coords(feature: &Value) -> Option<Vec<[f64; 2]>> {
    let geometry = feature.get("geometry")?;
    if geometry.get("type").and_then(Value::as_str) != Some("LineString") {
        return None;
    }
    let coords = geometry.get("coordinates").and_then(Value::as_array)?;
    let mut out = Vec::with_capacity(coords.len());
    for pair in coords {
        let pair = pair.as_array()?;
        out.push([pair.first()?.as_f64()?, pair.get(1)?.as_f64()?]);
    }
    Some(out)
}

/// Generate the aggregated zone collection for `catalog`.
///
/// Lines whose geometry cannot be loaded are skipped whole; segments that
/// cannot be resolved are skipped individually. Neither aborts the run.
pub fn generate(catalog: &ZoneCatalog, lines_dir: &Path, stations: &StationIndex) -> Value {
    let mut features: Vec<Value> = Vec::new();
    for line in &catalog.lines {
        let path = lines_dir.join(line_file_name(&line.line));
        let coords = match load_line_coords(&path) {
            Ok(coords) if coords.len() >= 2 => coords,
            Ok(_) => {
                log::warn!(
                    "Geometry in {} has fewer than two points, skipping {}",
                    path.display(),
                    line.line
                );
                continue;
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", line.line, e);
                continue;
            }
        };
        log::debug!(
            "Loaded {} points for {} from {}",
            coords.len(),
            line.line,
            path.display()
        );
        let tree = geo_util::vertex_tree(&coords);
        for segment in &line.segments {
            if let Some(slice) = resolve_segment(&coords, &tree, stations, segment) {
                features.extend(segment_features(&line.line, segment, slice));
            }
        }
    }
    convert_to_geojson(&features)
}

/// Slice the line between the vertices nearest to the segment's stations.
/// The slice is inclusive on both ends and always runs from -> to.
fn resolve_segment(
    coords: &[[f64; 2]],
    tree: &RTree<VertexNode>,
    stations: &StationIndex,
    segment: &SegmentSpec,
) -> Option<Vec<[f64; 2]>> {
    let from = lookup_station(stations, &segment.from)?;
    let to = lookup_station(stations, &segment.to)?;
    let i = snap_to_line(coords, tree, from, &segment.from)?;
    let j = snap_to_line(coords, tree, to, &segment.to)?;
    if i == j {
        log::warn!(
            "{} and {} snap to the same point on the line, skipping",
            segment.from,
            segment.to
        );
        return None;
    }
    let slice = if i < j {
        coords[i..=j].to_vec()
    } else {
        coords[j..=i].iter().rev().copied().collect()
    };
    Some(slice)
}

fn lookup_station(stations: &StationIndex, name: &str) -> Option<Point> {
    let point = stations.lookup(name);
    if point.is_none() {
        log::warn!("Station {:?} is not in the station reference, skipping", name);
    }
    point
}

fn snap_to_line(
    coords: &[[f64; 2]],
    tree: &RTree<VertexNode>,
    point: Point,
    name: &str,
) -> Option<usize> {
    let index = geo_util::nearest_vertex(tree, point)?;
    let vertex = coords[index];
    let distance = geo_util::haversine(point.x(), point.y(), vertex[0], vertex[1]);
    if distance > MAX_SNAP_METERS {
        log::warn!(
            "Station {:?} is {:.0} m from the nearest point of the line, skipping",
            name,
            distance
        );
        return None;
    }
    Some(index)
}

/// One or two features for a resolved segment: "Both ways" fans out into two
/// opposite directional features, the second with reversed geometry and
/// swapped endpoints.
fn segment_features(line: &str, segment: &SegmentSpec, slice: Vec<[f64; 2]>) -> Vec<Value> {
    match segment.direction {
        Direction::BothWays => {
            let first = slice.first().copied().unwrap_or_default();
            let last = slice.last().copied().unwrap_or_default();
            let forward = geo_util::compass_direction(
                Point::new(first[0], first[1]),
                Point::new(last[0], last[1]),
            );
            let reversed: Vec<[f64; 2]> = slice.iter().rev().copied().collect();
            vec![
                zone_feature(line, &segment.from, &segment.to, forward, &slice),
                zone_feature(line, &segment.to, &segment.from, forward.opposite(), &reversed),
            ]
        }
        direction => vec![zone_feature(line, &segment.from, &segment.to, direction, &slice)],
    }
}

fn zone_feature(
    line: &str,
    from: &str,
    to: &str,
    direction: Direction,
    coords: &[[f64; 2]],
) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": coords,
        },
        "properties": {
            "line": line,
            "from_station": from,
            "to_station": to,
            "direction": direction,
            "zone_type": ZONE_TYPE,
            "name": format!("{} RSZ: {} to {} ({})", line, from, to, direction),
        },
    })
}
