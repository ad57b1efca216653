use std::collections::HashMap;
use std::fs;
use std::path::Path;

use geo_types::Point;
use serde_json::Value;

use super::error::Error;

/// Station-location reference: normalized station name -> WGS84 point.
///
/// Loaded from a GeoJSON FeatureCollection of Point features carrying a
/// `name` property, as written by `gtfs2lines --stations-out`.
pub struct StationIndex {
    by_name: HashMap<String, Point>,
}

impl StationIndex {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<StationIndex, Error> {
        let raw = fs::read_to_string(&path)?;
        let doc: Value = serde_json::from_str(&raw)?;
        let features = doc
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::UnexpectedStructure(path.as_ref().display().to_string()))?;

        let mut by_name = HashMap::new();
        for feature in features {
            let Some(name) = feature.pointer("/properties/name").and_then(Value::as_str) else {
                continue;
            };
            let Some(geometry) = feature.get("geometry") else {
                continue;
            };
            if geometry.get("type").and_then(Value::as_str) != Some("Point") {
                continue;
            }
            let Some(coords) = geometry.get("coordinates").and_then(Value::as_array) else {
                continue;
            };
            let (Some(lon), Some(lat)) = (
                coords.first().and_then(Value::as_f64),
                coords.get(1).and_then(Value::as_f64),
            ) else {
                continue;
            };
            by_name
                .entry(normalize_name(name))
                .or_insert_with(|| Point::new(lon, lat));
        }
        Ok(StationIndex { by_name })
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Look up a station by display name (normalization-insensitive).
    pub fn lookup(&self, name: &str) -> Option<Point> {
        self.by_name.get(&normalize_name(name)).copied()
    }
}

/// Normalize a station name for lookup: case and surrounding whitespace are
/// ignored, inner whitespace is collapsed, and a trailing "station" word is
/// dropped, so "BLOOR-YONGE STATION" matches "Bloor-Yonge".
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut words: Vec<&str> = lowered.split_whitespace().collect();
    if words.len() > 1 && words.last() == Some(&"station") {
        words.pop();
    }
    words.join(" ")
}
