//! Indoor wayfinding engine.
//!
//! Models a facility floor as a navigable graph and computes admissible
//! routes between points of interest, together with distance and time
//! estimates, a difficulty classification and turn-by-turn instructions.

pub mod config;
pub mod error;
pub mod graph;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod store;

pub use config::RoutingConfig;
pub use error::Error;
pub use loading::{FloorPlan, load_floor_plan, load_floor_plans};
pub use model::{
    DifficultyLevel, Edge, EdgeKind, EntityType, IndoorMap, InstructionStep, Node, NodeKind,
    Position, PositioningTechnology, Route, RouteType, StepAction, Waypoint,
};
pub use routing::{CancellationToken, RouteAssembler, RouteRequest};
pub use store::{GraphStore, InMemoryGraphStore, MapSnapshot};

/// Identifier of an indoor map (one facility floor)
pub type MapId = uuid::Uuid;
/// Identifier of a routable node
pub type NodeId = uuid::Uuid;
/// Identifier of an edge between two nodes
pub type EdgeId = uuid::Uuid;
/// Identifier of a computed route
pub type RouteId = uuid::Uuid;

/// Average walking speed in map distance units per second
pub const DEFAULT_AVERAGE_SPEED: f64 = 1.4;

/// Number of heap pops between two checks of the cancellation token
pub(crate) const CANCELLATION_CHECK_INTERVAL: usize = 256;
