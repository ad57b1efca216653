use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use crate::gtfs::structs::{Route, Shape, Trip};

use super::error::Error;
use super::geojson;

/// MTA blue, used when a route carries no usable color of its own.
pub const DEFAULT_ROUTE_COLOR: &str = "#0039a6";

/// Map each route to the distinct shapes its trips run on.
///
/// Trips lacking a route or shape reference are skipped silently. Shape ids
/// are kept in an ordered set so downstream feature order is deterministic.
pub fn build_route_shape_map(trips: &[Trip]) -> HashMap<String, BTreeSet<String>> {
    let mut route_to_shapes: HashMap<String, BTreeSet<String>> = HashMap::new();
    for trip in trips {
        if let (Some(route_id), Some(shape_id)) = (&trip.route_id, &trip.shape_id) {
            route_to_shapes
                .entry(route_id.clone())
                .or_default()
                .insert(shape_id.clone());
        }
    }
    route_to_shapes
}

/// Map each shape to its coordinate sequence.
///
/// Rows with unparseable sequence or coordinate fields are dropped; the rest
/// are sorted ascending by point sequence and emitted as `[lon, lat]` pairs.
pub fn build_shape_coords(shapes: &[Shape]) -> HashMap<String, Vec<[f64; 2]>> {
    let mut samples: HashMap<String, Vec<(i64, f64, f64)>> = HashMap::new();
    for shape in shapes {
        let (Some(seq), Some(lat), Some(lon)) =
            (shape.shape_pt_sequence, shape.shape_pt_lat, shape.shape_pt_lon)
        else {
            continue;
        };
        samples
            .entry(shape.shape_id.clone())
            .or_default()
            .push((seq, lat, lon));
    }
    samples
        .into_iter()
        .map(|(shape_id, mut pts)| {
            pts.sort_by_key(|p| p.0);
            let coords = pts.into_iter().map(|(_, lat, lon)| [lon, lat]).collect();
            (shape_id, coords)
        })
        .collect()
}

/// Validate a GTFS route color (RGB hex without a leading '#').
///
/// Accepts exactly 3 or 6 hex digits, with or without a '#'; anything else
/// falls back to `fallback`.
pub fn hex_color(value: Option<&str>, fallback: &str) -> String {
    let Some(value) = value else {
        return fallback.to_string();
    };
    let v = value.trim().trim_start_matches('#');
    if (v.len() == 3 || v.len() == 6) && v.chars().all(|c| c.is_ascii_hexdigit()) {
        format!("#{v}")
    } else {
        fallback.to_string()
    }
}

/// Keep letters and digits only, for filesystem-safe file names.
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// File-name slug for a route: sanitized display name, else sanitized route
/// id, else a generic placeholder.
pub fn route_slug(route: &Route) -> String {
    let slug = sanitize_name(&route.display_name());
    if !slug.is_empty() {
        return slug;
    }
    let slug = sanitize_name(&route.route_id);
    if !slug.is_empty() {
        return slug;
    }
    "route".to_string()
}

/// Write one GeoJSON line file per route with at least one resolved shape.
///
/// Returns the number of files written. Name collisions are disambiguated
/// deterministically: the first route keeps `line<slug>.json`, later routes
/// sanitizing to the same slug get a route-id suffix and a warning.
pub fn write_route_files(
    routes: &[Route],
    trips: &[Trip],
    shapes: &[Shape],
    out_dir: &Path,
    network: &str,
    attribution: &str,
) -> Result<usize, Error> {
    let route_to_shapes = build_route_shape_map(trips);
    let shape_coords = build_shape_coords(shapes);

    fs::create_dir_all(out_dir)?;

    // file name -> owning route id, for collision reporting
    let mut claimed: HashMap<String, String> = HashMap::new();
    let mut written = 0;
    for route in routes {
        let Some(shape_ids) = route_to_shapes.get(&route.route_id) else {
            continue;
        };
        let Some(collection) =
            geojson::route_feature_collection(route, shape_ids, &shape_coords, network, attribution)
        else {
            log::debug!(
                "Route {} has no shapes with usable coordinates, skipping",
                route.route_id
            );
            continue;
        };
        let Some(file_name) = claim_file_name(route, &mut claimed) else {
            continue;
        };
        let path = out_dir.join(&file_name);
        fs::write(&path, serde_json::to_string(&collection)?)?;
        log::info!("Wrote {}", path.display());
        written += 1;
    }
    Ok(written)
}

fn claim_file_name(route: &Route, claimed: &mut HashMap<String, String>) -> Option<String> {
    let slug = route_slug(route);
    let plain = format!("line{slug}.json");
    if !claimed.contains_key(&plain) {
        claimed.insert(plain.clone(), route.route_id.clone());
        return Some(plain);
    }
    let suffixed = format!("line{}_{}.json", slug, sanitize_name(&route.route_id));
    if claimed.contains_key(&suffixed) {
        log::warn!(
            "Routes {} and {} both map to {} and the disambiguated name {} is also taken, skipping route {}",
            claimed[&plain],
            route.route_id,
            plain,
            suffixed,
            route.route_id
        );
        return None;
    }
    log::warn!(
        "Routes {} and {} both map to {}; writing the latter to {}",
        claimed[&plain],
        route.route_id,
        plain,
        suffixed
    );
    claimed.insert(suffixed.clone(), route.route_id.clone());
    Some(suffixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(trip_id: &str, route_id: Option<&str>, shape_id: Option<&str>) -> Trip {
        Trip {
            trip_id: trip_id.to_string(),
            route_id: route_id.map(String::from),
            shape_id: shape_id.map(String::from),
        }
    }

    fn shape(shape_id: &str, seq: Option<i64>, lat: Option<f64>, lon: Option<f64>) -> Shape {
        Shape {
            shape_id: shape_id.to_string(),
            shape_pt_lat: lat,
            shape_pt_lon: lon,
            shape_pt_sequence: seq,
        }
    }

    fn route(id: &str, short: Option<&str>, long: Option<&str>) -> Route {
        Route {
            route_id: id.to_string(),
            route_short_name: short.map(String::from),
            route_long_name: long.map(String::from),
            route_color: None,
        }
    }

    #[test]
    fn test_route_shape_map_skips_incomplete_trips() {
        let trips = vec![
            trip("t1", Some("A"), Some("S1")),
            trip("t2", Some("A"), Some("S1")),
            trip("t3", Some("A"), Some("S2")),
            trip("t4", None, Some("S3")),
            trip("t5", Some("B"), None),
        ];
        let map = build_route_shape_map(&trips);
        assert_eq!(map.len(), 1);
        let shapes: Vec<&String> = map["A"].iter().collect();
        assert_eq!(shapes, ["S1", "S2"]);
    }

    #[test]
    fn test_shape_coords_sorted_and_lon_lat_order() {
        let shapes = vec![
            shape("S1", Some(3), Some(40.3), Some(-74.3)),
            shape("S1", Some(1), Some(40.1), Some(-74.1)),
            shape("S1", Some(2), Some(40.2), Some(-74.2)),
        ];
        let coords = build_shape_coords(&shapes);
        assert_eq!(
            coords["S1"],
            vec![[-74.1, 40.1], [-74.2, 40.2], [-74.3, 40.3]]
        );
    }

    #[test]
    fn test_shape_coords_drops_malformed_rows() {
        let shapes = vec![
            shape("S1", Some(1), Some(40.1), Some(-74.1)),
            shape("S1", None, Some(40.2), Some(-74.2)),
            shape("S1", Some(3), None, Some(-74.3)),
            shape("S1", Some(4), Some(40.4), None),
        ];
        let coords = build_shape_coords(&shapes);
        assert_eq!(coords["S1"], vec![[-74.1, 40.1]]);
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(Some("FF0000"), DEFAULT_ROUTE_COLOR), "#FF0000");
        assert_eq!(hex_color(Some("#FF0000"), DEFAULT_ROUTE_COLOR), "#FF0000");
        assert_eq!(hex_color(Some("abc"), DEFAULT_ROUTE_COLOR), "#abc");
        assert_eq!(hex_color(Some(""), DEFAULT_ROUTE_COLOR), DEFAULT_ROUTE_COLOR);
        assert_eq!(hex_color(None, DEFAULT_ROUTE_COLOR), DEFAULT_ROUTE_COLOR);
        assert_eq!(
            hex_color(Some("12"), DEFAULT_ROUTE_COLOR),
            DEFAULT_ROUTE_COLOR
        );
        assert_eq!(
            hex_color(Some("GGGGGG"), DEFAULT_ROUTE_COLOR),
            DEFAULT_ROUTE_COLOR
        );
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("7th Ave Express!!"), "7thAveExpress");
        assert_eq!(sanitize_name("A"), "A");
        assert_eq!(sanitize_name("!!"), "");
    }

    #[test]
    fn test_route_slug_fallbacks() {
        assert_eq!(route_slug(&route("A", Some("7th Ave!"), None)), "7thAve");
        assert_eq!(route_slug(&route("A", Some("!!"), None)), "A");
        assert_eq!(route_slug(&route("!!", Some("!!"), None)), "route");
    }

    #[test]
    fn test_display_name_fallback_chain() {
        assert_eq!(route("R1", Some("A"), Some("8 Av Exp")).display_name(), "A");
        assert_eq!(route("R1", None, Some("8 Av Exp")).display_name(), "8 Av Exp");
        assert_eq!(route("R1", Some("  "), None).display_name(), "R1");
    }

    #[test]
    fn test_claim_file_name_disambiguates() {
        let mut claimed = HashMap::new();
        let first = route("A-1", Some("A"), None);
        let second = route("A.1", Some("A"), None);
        assert_eq!(
            claim_file_name(&first, &mut claimed).as_deref(),
            Some("lineA.json")
        );
        assert_eq!(
            claim_file_name(&second, &mut claimed).as_deref(),
            Some("lineA_A1.json")
        );
    }
}
