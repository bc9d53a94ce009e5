//! Data model for indoor wayfinding
//!
//! Contains the floor map, its nodes and edges, entity positions and the
//! route records produced by a search.

pub mod edge;
pub mod map;
pub mod node;
pub mod position;
pub mod route;

pub use edge::{Edge, EdgeKind};
pub use map::IndoorMap;
pub use node::{Node, NodeKind};
pub use position::{EntityType, Position, PositioningTechnology};
pub use route::{DifficultyLevel, InstructionStep, Route, RouteType, StepAction, Waypoint};
