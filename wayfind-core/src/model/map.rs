//! Indoor map (one facility floor)

use geo::{Contains, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::MapId;

/// One modeled building floor with its own local coordinate system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndoorMap {
    pub id: MapId,
    /// Reference to the facility this floor belongs to
    pub facility_id: String,
    pub floor_number: i32,
    #[serde(default)]
    pub floor_name: Option<String>,
    /// Label of the local coordinate system, e.g. `"local-meters"`
    #[serde(default)]
    pub coordinate_system: Option<String>,
    /// Local units per meter
    #[serde(default = "default_scale")]
    pub scale_factor: f64,
    /// Floor outline as (longitude, latitude) pairs
    #[serde(default)]
    pub boundary: Vec<[f64; 2]>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_scale() -> f64 {
    1.0
}

fn default_active() -> bool {
    true
}

impl IndoorMap {
    pub fn new(id: MapId, facility_id: impl Into<String>, floor_number: i32) -> Self {
        Self {
            id,
            facility_id: facility_id.into(),
            floor_number,
            floor_name: None,
            coordinate_system: None,
            scale_factor: default_scale(),
            boundary: Vec::new(),
            active: true,
        }
    }

    /// Boundary polygon, `None` when the map has no outline
    pub fn boundary_polygon(&self) -> Option<Polygon<f64>> {
        if self.boundary.len() < 3 {
            return None;
        }
        let exterior: LineString<f64> = self.boundary.iter().map(|&[x, y]| (x, y)).collect();
        Some(Polygon::new(exterior, vec![]))
    }

    /// Whether a geographic point lies inside the floor outline.
    /// Maps without an outline contain every point.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        self.boundary_polygon()
            .is_none_or(|polygon| polygon.contains(&Point::new(longitude, latitude)))
    }
}
