use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};

use transit_geojson::zones::catalog::ZoneCatalog;
use transit_geojson::zones::extractor::generate;
use transit_geojson::zones::stations::StationIndex;

// straight north-south line, one vertex per ~111 m
fn line_coords() -> Vec<Value> {
    (0..10)
        .map(|i| json!([-79.4, 43.70 + 0.001 * i as f64]))
        .collect()
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "transit-geojson-zones-{}-{}",
        std::process::id(),
        name
    ));
    fs::remove_dir_all(&dir).ok();
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_fixtures(dir: &PathBuf) {
    // line file in the exporter's output shape
    let line = json!({
        "type": "FeatureCollection",
        "name": "TTC 1",
        "metadata": {
            "type": "rail-line",
            "color": "#ffcb0a",
            "id": "ttc/1",
            "name": "1",
            "sources": ["TTC GTFS"]
        },
        "features": [
            {
                "type": "Feature",
                "properties": {"type": "tracks", "route_id": "1", "route_short_name": "1", "color": "#ffcb0a"},
                "geometry": {"type": "LineString", "coordinates": line_coords()}
            }
        ]
    });
    fs::write(dir.join("line1.json"), serde_json::to_string(&line).unwrap()).unwrap();

    let coords = line_coords();
    let stations = json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Alder"},
                "geometry": {"type": "Point", "coordinates": coords[1]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Birch"},
                "geometry": {"type": "Point", "coordinates": coords[4]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Cedar"},
                "geometry": {"type": "Point", "coordinates": coords[8]}
            }
        ]
    });
    fs::write(
        dir.join("stations.json"),
        serde_json::to_string(&stations).unwrap(),
    )
    .unwrap();
}

fn catalog() -> ZoneCatalog {
    serde_json::from_value(json!({
        "lines": [
            {
                "line": "Line 1",
                "segments": [
                    {"from": "Birch", "to": "Alder", "direction": "Southbound"},
                    {"from": "Birch", "to": "Cedar", "direction": "Both ways"},
                    {"from": "Alder", "to": "Ghost Stop", "direction": "Northbound"}
                ]
            },
            {
                "line": "Line 9",
                "segments": [
                    {"from": "Alder", "to": "Birch", "direction": "Northbound"}
                ]
            }
        ]
    }))
    .unwrap()
}

#[test]
fn test_zone_generation_end_to_end() {
    let dir = fixture_dir("e2e");
    write_fixtures(&dir);

    let stations = StationIndex::from_path(dir.join("stations.json")).unwrap();
    assert_eq!(stations.len(), 3);

    let collection = generate(&catalog(), &dir, &stations);
    assert_eq!(collection["type"], "FeatureCollection");
    let features = collection["features"].as_array().unwrap();

    // one southbound + two for "Both ways"; the Ghost Stop segment and the
    // whole of Line 9 (no line9.json) are skipped
    assert_eq!(features.len(), 3);

    // Birch (idx 4) -> Alder (idx 1): end precedes start, so the slice is
    // reversed to run from Birch down to Alder
    let southbound = &features[0];
    assert_eq!(southbound["properties"]["line"], "Line 1");
    assert_eq!(southbound["properties"]["from_station"], "Birch");
    assert_eq!(southbound["properties"]["to_station"], "Alder");
    assert_eq!(southbound["properties"]["direction"], "Southbound");
    assert_eq!(southbound["properties"]["zone_type"], "Reduced Speed Zone");
    assert_eq!(
        southbound["properties"]["name"],
        "Line 1 RSZ: Birch to Alder (Southbound)"
    );
    let expected = line_coords();
    let coords = southbound["geometry"]["coordinates"].as_array().unwrap();
    assert_eq!(coords.len(), 4);
    assert_eq!(coords[0], expected[4]);
    assert_eq!(coords[3], expected[1]);

    // "Both ways" fans out into two opposite features
    let north = &features[1];
    let south = &features[2];
    assert_eq!(north["properties"]["direction"], "Northbound");
    assert_eq!(north["properties"]["from_station"], "Birch");
    assert_eq!(north["properties"]["to_station"], "Cedar");
    assert_eq!(south["properties"]["direction"], "Southbound");
    assert_eq!(south["properties"]["from_station"], "Cedar");
    assert_eq!(south["properties"]["to_station"], "Birch");

    let forward = north["geometry"]["coordinates"].as_array().unwrap();
    let mut backward = south["geometry"]["coordinates"].as_array().unwrap().clone();
    backward.reverse();
    assert_eq!(forward, &backward);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_bare_feature_line_file() {
    let dir = fixture_dir("bare");
    write_fixtures(&dir);

    // overwrite line1.json with a bare feature instead of a collection
    let bare = json!({
        "type": "Feature",
        "properties": {"type": "tracks"},
        "geometry": {"type": "LineString", "coordinates": line_coords()}
    });
    fs::write(dir.join("line1.json"), serde_json::to_string(&bare).unwrap()).unwrap();

    let stations = StationIndex::from_path(dir.join("stations.json")).unwrap();
    let catalog: ZoneCatalog = serde_json::from_value(json!({
        "lines": [
            {
                "line": "Line 1",
                "segments": [
                    {"from": "Alder", "to": "Birch", "direction": "Northbound"}
                ]
            }
        ]
    }))
    .unwrap();

    let collection = generate(&catalog, &dir, &stations);
    let features = collection["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(features[0]["properties"]["direction"], "Northbound");

    fs::remove_dir_all(&dir).ok();
}
