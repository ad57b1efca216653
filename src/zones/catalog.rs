use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::Error;

/// Hand-curated catalog of reduced speed zones, grouped by line. Loaded from
/// a JSON file so new lists can be published without a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneCatalog {
    pub lines: Vec<LineZones>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineZones {
    /// Display name of the line, e.g. "Line 1"
    pub line: String,
    pub segments: Vec<SegmentSpec>,
}

/// One reduced-speed segment between two named stations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub from: String,
    pub to: String,
    pub direction: Direction,
}

/// Direction labels as they appear in the published zone lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Northbound,
    Southbound,
    Eastbound,
    Westbound,
    #[serde(rename = "Both ways")]
    BothWays,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Northbound => Direction::Southbound,
            Direction::Southbound => Direction::Northbound,
            Direction::Eastbound => Direction::Westbound,
            Direction::Westbound => Direction::Eastbound,
            Direction::BothWays => Direction::BothWays,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Northbound => "Northbound",
            Direction::Southbound => "Southbound",
            Direction::Eastbound => "Eastbound",
            Direction::Westbound => "Westbound",
            Direction::BothWays => "Both ways",
        })
    }
}

impl ZoneCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ZoneCatalog, Error> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}
