//! Traversable connections between nodes

use serde::{Deserialize, Serialize};

use crate::{EdgeId, MapId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    #[default]
    Corridor,
    Stairs,
    Elevator,
    Ramp,
    Door,
    Escalator,
    Other,
}

/// Graph edge. Traversal is always permitted `from` → `to`, and also
/// `to` → `from` when `bidirectional` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub map_id: MapId,
    pub from_node: NodeId,
    pub to_node: NodeId,
    /// Intermediate points in local coordinates, excluding the endpoints
    #[serde(default)]
    pub geometry: Vec<[f64; 2]>,
    #[serde(default)]
    pub kind: EdgeKind,
    #[serde(default = "default_true")]
    pub accessible: bool,
    #[serde(default = "default_true")]
    pub bidirectional: bool,
    /// Length in the same units as node coordinates
    pub distance: f64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    /// Cost multiplier penalizing undesirable edges
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub emergency_route: bool,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub restriction_reason: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

impl Edge {
    /// Accessible, bidirectional corridor
    pub fn new(
        id: EdgeId,
        map_id: MapId,
        from_node: NodeId,
        to_node: NodeId,
        distance: f64,
    ) -> Self {
        Self {
            id,
            map_id,
            from_node,
            to_node,
            geometry: Vec::new(),
            kind: EdgeKind::Corridor,
            accessible: true,
            bidirectional: true,
            distance,
            width: None,
            height: None,
            weight: default_weight(),
            max_speed: None,
            emergency_route: false,
            restricted: false,
            restriction_reason: None,
        }
    }

    /// Search cost of traversing the edge
    pub fn cost(&self) -> f64 {
        self.distance * self.weight
    }

    /// Whether the edge joins `a` and `b`, honouring direction
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.from_node == a && self.to_node == b)
            || (self.bidirectional && self.from_node == b && self.to_node == a)
    }

    /// Same edge traversed `to` → `from`
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut edge = self.clone();
        std::mem::swap(&mut edge.from_node, &mut edge.to_node);
        edge.geometry.reverse();
        edge
    }
}
