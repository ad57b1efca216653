use std::collections::{BTreeSet, HashMap, HashSet};

use serde_json::{json, Value};

use crate::gtfs::structs::{Route, Stop};

use super::aggregator::{hex_color, DEFAULT_ROUTE_COLOR};

pub fn convert_to_geojson(features: &Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// One "tracks" feature per shape of the route. Shapes with no resolved
/// coordinates contribute nothing.
pub fn route_features(
    route_id: &str,
    display_name: &str,
    color: &str,
    shape_ids: &BTreeSet<String>,
    shape_coords: &HashMap<String, Vec<[f64; 2]>>,
) -> Vec<Value> {
    shape_ids
        .iter()
        .filter_map(|shape_id| {
            let coords = shape_coords.get(shape_id)?;
            if coords.is_empty() {
                return None;
            }
            Some(json!({
                "type": "Feature",
                "properties": {
                    "type": "tracks",
                    "route_id": route_id,
                    "route_short_name": display_name,
                    "color": color,
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": coords,
                },
            }))
        })
        .collect()
}

/// Full per-route line file: a metadata block the map renderer keys on, plus
/// one feature per shape. Returns None when no shape resolved coordinates so
/// the route produces no file at all.
pub fn route_feature_collection(
    route: &Route,
    shape_ids: &BTreeSet<String>,
    shape_coords: &HashMap<String, Vec<[f64; 2]>>,
    network: &str,
    attribution: &str,
) -> Option<Value> {
    let display_name = route.display_name();
    let color = hex_color(route.route_color.as_deref(), DEFAULT_ROUTE_COLOR);
    let features = route_features(
        &route.route_id,
        &display_name,
        &color,
        shape_ids,
        shape_coords,
    );
    if features.is_empty() {
        return None;
    }
    Some(json!({
        "type": "FeatureCollection",
        "name": format!("{} {}", network.to_uppercase(), display_name),
        "metadata": {
            "type": "rail-line",
            "color": color,
            "id": format!("{}/{}", network, display_name),
            "name": display_name,
            "sources": [attribution],
        },
        "features": features,
    }))
}

/// Station reference file consumed by the rsz tool: one Point feature per
/// named station. Duplicate names keep the first occurrence.
pub fn station_feature_collection(stops: &[Stop]) -> Value {
    let mut seen: HashSet<String> = HashSet::new();
    let features: Vec<Value> = stops
        .iter()
        .filter_map(|stop| {
            if !stop.is_station() {
                return None;
            }
            let name = stop.stop_name.as_deref()?.trim();
            if name.is_empty() {
                return None;
            }
            let (lat, lon) = (stop.stop_lat?, stop.stop_lon?);
            if !seen.insert(name.to_string()) {
                log::debug!("Duplicate station name {:?}, keeping the first", name);
                return None;
            }
            Some(json!({
                "type": "Feature",
                "properties": {
                    "name": name,
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [lon, lat],
                },
            }))
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "name": "stations",
        "features": features,
    })
}
