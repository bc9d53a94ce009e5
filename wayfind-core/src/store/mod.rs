//! Graph store adapter
//!
//! The routing engine reads maps, nodes and edges through [`GraphStore`] and
//! never mutates them. The only write is persisting a finished [`Route`].

mod memory;

pub use memory::{DEFAULT_ROUTE_CAPACITY, InMemoryGraphStore};

use crate::{
    EdgeId, Error, MapId, NodeId, RouteId,
    model::{Edge, EntityType, IndoorMap, Node, Position, Route},
};

/// Consistent copy of one map's nodes and edges, taken under a single read
#[derive(Debug, Clone)]
pub struct MapSnapshot {
    pub map: IndoorMap,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Source of graph data for route computation.
///
/// Implementations must be safe to share between concurrent route requests.
pub trait GraphStore: Send + Sync {
    fn get_map(&self, map_id: MapId) -> Result<IndoorMap, Error>;

    fn get_node(&self, node_id: NodeId) -> Result<Node, Error>;

    /// Edge records departing `node_id`, including bidirectional edges whose
    /// `to_node` is `node_id`. Records are returned as stored.
    fn get_outgoing_edges(&self, node_id: NodeId) -> Result<Vec<Edge>, Error>;

    /// All nodes and edges of a map, read atomically
    fn map_snapshot(&self, map_id: MapId) -> Result<MapSnapshot, Error>;

    /// Nearest node of `map_id` within `radius` meters of a geographic point
    fn find_nearest_node(
        &self,
        map_id: MapId,
        longitude: f64,
        latitude: f64,
        radius: f64,
    ) -> Result<Option<Node>, Error>;

    fn get_latest_position(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Result<Option<Position>, Error>;

    fn save_route(&self, route: &Route) -> Result<(), Error>;

    fn get_route(&self, route_id: RouteId) -> Result<Route, Error>;
}

pub(crate) fn edge_not_found(edge_id: EdgeId) -> Error {
    Error::not_found("edge", edge_id)
}
