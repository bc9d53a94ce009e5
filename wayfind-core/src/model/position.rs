//! Entity positions, read only to resolve the nearest node

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MapId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Asset,
    Vehicle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositioningTechnology {
    Gps,
    Wifi,
    Ble,
    Uwb,
    #[default]
    Manual,
}

/// Location of a person or asset on a map at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub map_id: MapId,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub floor_level: i32,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub technology: PositioningTechnology,
    pub recorded_at: DateTime<Utc>,
}
