pub use crate::DEFAULT_AVERAGE_SPEED;

// Re-export key components
pub use crate::config::RoutingConfig;
pub use crate::error::Error;
pub use crate::graph::{RouteGraph, Traversal};
pub use crate::loading::{FloorPlan, load_floor_plan, load_floor_plans};
pub use crate::routing::metrics::RouteMetrics;
pub use crate::routing::{
    CancellationToken, RouteAssembler, RouteRequest, SearchPath, find_path, synthesize,
};
pub use crate::store::{GraphStore, InMemoryGraphStore, MapSnapshot};

// Data model
pub use crate::model::{
    DifficultyLevel, Edge, EdgeKind, EntityType, IndoorMap, InstructionStep, Node, NodeKind,
    Position, PositioningTechnology, Route, RouteType, StepAction, Waypoint,
};

// Identifiers
pub use crate::{EdgeId, MapId, NodeId, RouteId};
