//! In-memory graph store with an R-tree over node locations

use std::{
    collections::VecDeque,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use geo::{Distance, Haversine, Point};
use hashbrown::HashMap;
use log::{debug, info};
use rstar::{AABB, RTree, primitives::GeomWithData};

use super::{GraphStore, MapSnapshot, edge_not_found};
use crate::{
    EdgeId, Error, MapId, NodeId, RouteId,
    loading::FloorPlan,
    model::{Edge, EntityType, IndoorMap, Node, Position, Route},
};

type IndexedNode = GeomWithData<[f64; 2], NodeId>;

/// Number of computed routes kept before the oldest are evicted
pub const DEFAULT_ROUTE_CAPACITY: usize = 10_000;

/// Meters per degree of latitude on the mean-radius sphere used by [`Haversine`]
const METERS_PER_DEGREE: f64 = 111_195.0;

#[derive(Debug)]
struct MapEntry {
    map: IndoorMap,
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    /// Nodes indexed by (longitude, latitude)
    rtree: RTree<IndexedNode>,
}

#[derive(Debug, Default)]
struct Inner {
    maps: HashMap<MapId, MapEntry>,
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
    /// Edge ids incident to each node, in insertion order
    incident: HashMap<NodeId, Vec<EdgeId>>,
    positions: HashMap<(EntityType, String), Position>,
    routes: HashMap<RouteId, Route>,
    /// Route ids in the order they were saved
    route_order: VecDeque<RouteId>,
}

/// Thread-safe store holding whole floor plans in memory.
///
/// Floor plans are replaced atomically, so a [`MapSnapshot`] never mixes
/// data from two versions of a map. At most `route_capacity` computed routes
/// are retained; saving beyond that evicts the oldest.
#[derive(Debug)]
pub struct InMemoryGraphStore {
    inner: RwLock<Inner>,
    route_capacity: usize,
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::with_route_capacity(DEFAULT_ROUTE_CAPACITY)
    }
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store retaining at most `route_capacity` routes (at least one)
    pub fn with_route_capacity(route_capacity: usize) -> Self {
        Self {
            inner: RwLock::default(),
            route_capacity: route_capacity.max(1),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, Error> {
        self.inner
            .read()
            .map_err(|_| Error::Store("graph store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, Error> {
        self.inner
            .write()
            .map_err(|_| Error::Store("graph store lock poisoned".to_string()))
    }

    /// Inserts or replaces a validated floor plan
    pub fn insert_floor_plan(&self, plan: FloorPlan) -> Result<(), Error> {
        plan.validate()?;
        let FloorPlan { map, nodes, edges } = plan;
        let map_id = map.id;

        let mut inner = self.write()?;
        if let Some(owner) = nodes
            .iter()
            .find_map(|node| inner.nodes.get(&node.id).filter(|n| n.map_id != map_id))
        {
            return Err(Error::InvalidData(format!(
                "node {} already belongs to map {}",
                owner.id, owner.map_id
            )));
        }
        if let Some(owner) = edges
            .iter()
            .find_map(|edge| inner.edges.get(&edge.id).filter(|e| e.map_id != map_id))
        {
            return Err(Error::InvalidData(format!(
                "edge {} already belongs to map {}",
                owner.id, owner.map_id
            )));
        }

        if let Some(previous) = inner.maps.remove(&map_id) {
            debug!("Replacing floor plan for map {map_id}");
            for node_id in &previous.nodes {
                inner.nodes.remove(node_id);
                inner.incident.remove(node_id);
            }
            for edge_id in &previous.edges {
                inner.edges.remove(edge_id);
            }
        }

        let points = nodes
            .iter()
            .map(|node| IndexedNode::new([node.longitude, node.latitude], node.id))
            .collect();
        let entry = MapEntry {
            map,
            nodes: nodes.iter().map(|node| node.id).collect(),
            edges: edges.iter().map(|edge| edge.id).collect(),
            rtree: RTree::bulk_load(points),
        };

        for node in nodes {
            inner.incident.entry(node.id).or_default();
            inner.nodes.insert(node.id, node);
        }
        for edge in edges {
            inner.incident.entry(edge.from_node).or_default().push(edge.id);
            if edge.to_node != edge.from_node {
                inner.incident.entry(edge.to_node).or_default().push(edge.id);
            }
            inner.edges.insert(edge.id, edge);
        }

        info!(
            "Loaded map {map_id} with {} nodes and {} edges",
            entry.nodes.len(),
            entry.edges.len()
        );
        inner.maps.insert(map_id, entry);
        Ok(())
    }

    /// Records a position, keeping only the most recent one per entity
    pub fn record_position(&self, position: Position) -> Result<(), Error> {
        let mut inner = self.write()?;
        let key = (position.entity_type, position.entity_id.clone());
        let is_newer = inner
            .positions
            .get(&key)
            .is_none_or(|current| current.recorded_at <= position.recorded_at);
        if is_newer {
            inner.positions.insert(key, position);
        }
        Ok(())
    }

    pub fn map_count(&self) -> usize {
        self.read().map_or(0, |inner| inner.maps.len())
    }

    pub fn route_count(&self) -> usize {
        self.read().map_or(0, |inner| inner.routes.len())
    }
}

impl GraphStore for InMemoryGraphStore {
    fn get_map(&self, map_id: MapId) -> Result<IndoorMap, Error> {
        self.read()?
            .maps
            .get(&map_id)
            .map(|entry| entry.map.clone())
            .ok_or_else(|| Error::not_found("map", map_id))
    }

    fn get_node(&self, node_id: NodeId) -> Result<Node, Error> {
        self.read()?
            .nodes
            .get(&node_id)
            .cloned()
            .ok_or_else(|| Error::not_found("node", node_id))
    }

    fn get_outgoing_edges(&self, node_id: NodeId) -> Result<Vec<Edge>, Error> {
        let inner = self.read()?;
        let incident = inner
            .incident
            .get(&node_id)
            .ok_or_else(|| Error::not_found("node", node_id))?;

        incident
            .iter()
            .map(|edge_id| inner.edges.get(edge_id).ok_or_else(|| edge_not_found(*edge_id)))
            .filter(|edge| {
                edge.as_ref().map_or(true, |edge| {
                    edge.from_node == node_id || (edge.bidirectional && edge.to_node == node_id)
                })
            })
            .map(|edge| edge.cloned())
            .collect()
    }

    fn map_snapshot(&self, map_id: MapId) -> Result<MapSnapshot, Error> {
        let inner = self.read()?;
        let entry = inner
            .maps
            .get(&map_id)
            .ok_or_else(|| Error::not_found("map", map_id))?;

        let nodes = entry
            .nodes
            .iter()
            .map(|id| inner.nodes.get(id).cloned().ok_or_else(|| Error::not_found("node", id)))
            .collect::<Result<Vec<_>, _>>()?;
        let edges = entry
            .edges
            .iter()
            .map(|id| inner.edges.get(id).cloned().ok_or_else(|| edge_not_found(*id)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MapSnapshot {
            map: entry.map.clone(),
            nodes,
            edges,
        })
    }

    fn find_nearest_node(
        &self,
        map_id: MapId,
        longitude: f64,
        latitude: f64,
        radius: f64,
    ) -> Result<Option<Node>, Error> {
        let inner = self.read()?;
        let entry = inner
            .maps
            .get(&map_id)
            .ok_or_else(|| Error::not_found("map", map_id))?;

        // Planar distance in degrees does not order candidates by ground
        // distance, so rank every node inside a box that bounds the radius.
        let origin = Point::new(longitude, latitude);
        let nearest = entry
            .rtree
            .locate_in_envelope(&search_envelope(longitude, latitude, radius))
            .map(|candidate| {
                let [lon, lat] = *candidate.geom();
                (candidate.data, Haversine.distance(origin, Point::new(lon, lat)))
            })
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(node_id, _)| inner.nodes.get(&node_id).cloned());

        Ok(nearest)
    }

    fn get_latest_position(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> Result<Option<Position>, Error> {
        Ok(self
            .read()?
            .positions
            .get(&(entity_type, entity_id.to_string()))
            .cloned())
    }

    fn save_route(&self, route: &Route) -> Result<(), Error> {
        let mut inner = self.write()?;
        if inner.routes.contains_key(&route.id) {
            return Err(Error::InvalidArgument(format!(
                "route {} already exists",
                route.id
            )));
        }
        while inner.routes.len() >= self.route_capacity {
            let Some(oldest) = inner.route_order.pop_front() else {
                break;
            };
            inner.routes.remove(&oldest);
            debug!("Evicted route {oldest}");
        }
        inner.routes.insert(route.id, route.clone());
        inner.route_order.push_back(route.id);
        Ok(())
    }

    fn get_route(&self, route_id: RouteId) -> Result<Route, Error> {
        self.read()?
            .routes
            .get(&route_id)
            .cloned()
            .ok_or_else(|| Error::not_found("route", route_id))
    }
}

/// Lon/lat box containing every point within `radius` meters of the origin
fn search_envelope(longitude: f64, latitude: f64, radius: f64) -> AABB<[f64; 2]> {
    // 10% slack covers the curvature the linear spans ignore
    let lat_span = 1.1 * radius / METERS_PER_DEGREE;
    let widest = (latitude.abs() + lat_span).min(90.0).to_radians().cos();
    let lon_span = if widest > 1e-9 {
        (lat_span / widest).min(360.0)
    } else {
        360.0
    };
    AABB::from_corners(
        [longitude - lon_span, latitude - lat_span],
        [longitude + lon_span, latitude + lat_span],
    )
}
