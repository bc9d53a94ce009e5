//! Routable points on a map

use serde::{Deserialize, Serialize};

use crate::{MapId, NodeId};

/// Kind of point of interest or junction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Entrance,
    #[default]
    Junction,
    Room,
    Elevator,
    Stairs,
    EmergencyExit,
    Other,
}

/// Graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Map the node belongs to
    pub map_id: MapId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub latitude: f64,
    /// Local planar coordinates in the map's coordinate system
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default = "default_true")]
    pub accessible: bool,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub current_occupancy: u32,
    #[serde(default)]
    pub floor_level: i32,
    #[serde(default)]
    pub emergency_exit: bool,
    #[serde(default)]
    pub elevator: bool,
    #[serde(default)]
    pub stairs: bool,
}

fn default_true() -> bool {
    true
}

impl Node {
    /// Accessible junction at the given local coordinates
    pub fn new(id: NodeId, map_id: MapId, x: f64, y: f64) -> Self {
        Self {
            id,
            map_id,
            name: None,
            longitude: 0.0,
            latitude: 0.0,
            x,
            y,
            kind: NodeKind::Junction,
            accessible: true,
            capacity: None,
            current_occupancy: 0,
            floor_level: 0,
            emergency_exit: false,
            elevator: false,
            stairs: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        match kind {
            NodeKind::Stairs => self.stairs = true,
            NodeKind::Elevator => self.elevator = true,
            NodeKind::EmergencyExit => self.emergency_exit = true,
            _ => {}
        }
        self
    }

    /// Name for display, falling back to the identifier
    pub fn label(&self) -> String {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map_or_else(|| self.id.to_string(), str::to_owned)
    }

    /// Euclidean distance over local coordinates
    pub fn planar_distance(&self, other: &Node) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
