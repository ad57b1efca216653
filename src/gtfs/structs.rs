use serde::{Deserialize, Serialize};

use crate::gtfs::raw_gtfs::deserialize_opt;

/// A transportation route.
/// https://gtfs.org/documentation/schedule/reference/#routestxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_long_name: Option<String>,
    #[serde(default)]
    pub route_color: Option<String>,
}

impl Route {
    /// Rider-facing name: short name, else long name, else the raw id.
    pub fn display_name(&self) -> String {
        self.route_short_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self
                .route_long_name
                .as_deref()
                .filter(|s| !s.trim().is_empty()))
            .unwrap_or(&self.route_id)
            .trim()
            .to_string()
    }
}

/// A scheduled trip for a route.
/// https://gtfs.org/documentation/schedule/reference/#tripstxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub route_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub shape_id: Option<String>,
}

/// Shape points that define the path of a route.
/// https://gtfs.org/documentation/schedule/reference/#shapestxt
///
/// Sequence and coordinates are lenient: a row that fails numeric parsing
/// keeps `None` there and is dropped during aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub shape_id: String,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub shape_pt_lat: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub shape_pt_lon: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub shape_pt_sequence: Option<i64>,
}

/// A physical stop, station, or area.
/// https://gtfs.org/documentation/schedule/reference/#stopstxt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub stop_lat: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub stop_lon: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub location_type: Option<i32>,
    #[serde(default)]
    pub parent_station: Option<String>,
}

impl Stop {
    /// Whether this stop represents a station on the map: either an explicit
    /// GTFS station record (`location_type = 1`) or a top-level stop with no
    /// parent station.
    pub fn is_station(&self) -> bool {
        match self.location_type {
            Some(1) => true,
            Some(0) | None => self
                .parent_station
                .as_deref()
                .map_or(true, |p| p.trim().is_empty()),
            Some(_) => false,
        }
    }
}
