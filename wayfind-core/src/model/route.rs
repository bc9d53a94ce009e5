//! Route records produced by a search

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::{Error, MapId, NodeId, RouteId};

/// Named admissibility policy constraining which edges a search may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteType {
    #[default]
    Shortest,
    AccessiblePath,
    EmergencyEvacuation,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shortest => "SHORTEST",
            Self::AccessiblePath => "ACCESSIBLE_PATH",
            Self::EmergencyEvacuation => "EMERGENCY_EVACUATION",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SHORTEST" => Ok(Self::Shortest),
            "ACCESSIBLE_PATH" => Ok(Self::AccessiblePath),
            "EMERGENCY_EVACUATION" => Ok(Self::EmergencyEvacuation),
            other => Err(Error::InvalidArgument(format!("unknown route type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyLevel {
    Easy,
    Moderate,
    Difficult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepAction {
    Start,
    ContinueStraight,
    GoUpStairs,
    TakeElevator,
    Arrive,
}

/// Machine-readable point along a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub node_id: NodeId,
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub floor_level: i32,
}

/// One turn-by-turn instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionStep {
    /// 1-based position in the instruction list
    pub step: usize,
    pub action: StepAction,
    pub instruction: String,
    pub node_id: NodeId,
    pub x: f64,
    pub y: f64,
    pub floor_level: i32,
}

/// Result of one path computation. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub map_id: MapId,
    pub from_node: NodeId,
    pub to_node: NodeId,
    /// Ordered node sequence, endpoints included
    pub path: Vec<NodeId>,
    pub route_type: RouteType,
    pub total_distance: f64,
    /// Estimated traversal time in seconds
    pub estimated_time: u64,
    pub difficulty: DifficultyLevel,
    pub accessible: bool,
    pub emergency: bool,
    pub restricted: bool,
    pub waypoints: Vec<Waypoint>,
    pub instructions: Vec<InstructionStep>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Route {
    /// Path geometry over the waypoints' local coordinates
    pub fn line_string(&self) -> LineString<f64> {
        self.waypoints.iter().map(|w| (w.x, w.y)).collect()
    }
}
