//! Route assembly: the single entry point that turns a request into a
//! persisted [`Route`].

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    Error, GraphStore, MapId, NodeId, RouteId, RoutingConfig,
    graph::RouteGraph,
    model::{EntityType, IndoorMap, Node, Route, RouteType},
    routing::{
        CancellationToken, RouteMetrics, SearchPath, find_path, find_path_to_any, synthesize,
    },
};

/// One route computation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub map_id: MapId,
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    #[serde(default)]
    pub route_type: RouteType,
    pub requested_by: String,
}

/// Orchestrates search, metrics and instruction synthesis, and is the only
/// component that writes routes to the store.
///
/// Holds no per-request state and can be shared across threads.
#[derive(Debug)]
pub struct RouteAssembler<S: GraphStore> {
    store: Arc<S>,
    config: RoutingConfig,
    metrics: RouteMetrics,
}

impl<S: GraphStore> Clone for RouteAssembler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            metrics: self.metrics,
        }
    }
}

impl<S: GraphStore> RouteAssembler<S> {
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configuration is invalid
    pub fn new(store: Arc<S>, config: RoutingConfig) -> Result<Self, Error> {
        config.validate()?;
        let metrics = RouteMetrics::new(config.average_speed);
        Ok(Self {
            store,
            config,
            metrics,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Computes and persists a route between two nodes of `map_id`
    ///
    /// # Errors
    ///
    /// - `NotFound` if the map or either node does not exist
    /// - `InvalidArgument` if the nodes are on different maps, not on
    ///   `map_id`, or the map is inactive
    /// - `RouteNotFound` if no path satisfies the route type
    /// - `Cancelled` if the configured search timeout elapses
    pub fn compute_route(
        &self,
        map_id: MapId,
        from_node_id: NodeId,
        to_node_id: NodeId,
        route_type: RouteType,
        requested_by: &str,
    ) -> Result<Route, Error> {
        let request = RouteRequest {
            map_id,
            from_node_id,
            to_node_id,
            route_type,
            requested_by: requested_by.to_string(),
        };
        self.compute_route_with(&request, &CancellationToken::new())
    }

    /// Same as [`Self::compute_route`] with a caller-supplied cancellation token
    ///
    /// # Errors
    ///
    /// See [`Self::compute_route`]
    pub fn compute_route_with(
        &self,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<Route, Error> {
        let cancel = self.scoped(cancel);
        self.active_map(request.map_id)?;

        let from = self.store.get_node(request.from_node_id)?;
        let to = self.store.get_node(request.to_node_id)?;
        if from.map_id != to.map_id {
            return Err(Error::InvalidArgument(format!(
                "nodes {} and {} are on different maps",
                from.id, to.id
            )));
        }
        if from.map_id != request.map_id {
            return Err(Error::InvalidArgument(format!(
                "node {} is not on map {}",
                from.id, request.map_id
            )));
        }

        let graph = RouteGraph::load(&*self.store, request.map_id)?;
        let path = find_path(&graph, from.id, to.id, request.route_type, &cancel)?;
        self.persist(&graph, &path, request.route_type, &request.requested_by)
    }

    /// Evaluates independent requests in parallel, one result per request
    pub fn compute_routes(&self, requests: &[RouteRequest]) -> Vec<Result<Route, Error>> {
        requests
            .par_iter()
            .map(|request| self.compute_route_with(request, &CancellationToken::new()))
            .collect()
    }

    /// Route from `from_node_id` to the cheapest reachable emergency exit,
    /// using only emergency-route edges
    ///
    /// # Errors
    ///
    /// - `NotFound` if the map or node does not exist
    /// - `InvalidArgument` if the node is on another map or the map has no exits
    /// - `RouteNotFound` if no exit is reachable
    pub fn compute_evacuation_route(
        &self,
        map_id: MapId,
        from_node_id: NodeId,
        requested_by: &str,
    ) -> Result<Route, Error> {
        let cancel = self.scoped(&CancellationToken::new());
        self.active_map(map_id)?;

        let from = self.store.get_node(from_node_id)?;
        if from.map_id != map_id {
            return Err(Error::InvalidArgument(format!(
                "node {from_node_id} is not on map {map_id}"
            )));
        }

        let graph = RouteGraph::load(&*self.store, map_id)?;
        let exits = graph.emergency_exits();
        if exits.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "map {map_id} has no emergency exits"
            )));
        }

        let route_type = RouteType::EmergencyEvacuation;
        let path = find_path_to_any(&graph, from_node_id, &exits, route_type, &cancel)?.ok_or(
            Error::RouteNotFound {
                from: from_node_id,
                to: None,
                route_type,
            },
        )?;
        self.persist(&graph, &path, route_type, requested_by)
    }

    /// Routes an entity from its latest recorded position, snapped to the
    /// nearest node within the configured radius
    ///
    /// # Errors
    ///
    /// - `NotFound` if the entity has no position, the position is on another
    ///   map, or no node lies within the radius
    /// - any error of [`Self::compute_route`]
    pub fn compute_route_from_position(
        &self,
        map_id: MapId,
        entity_type: EntityType,
        entity_id: &str,
        to_node_id: NodeId,
        route_type: RouteType,
        requested_by: &str,
    ) -> Result<Route, Error> {
        let position = self
            .store
            .get_latest_position(entity_type, entity_id)?
            .filter(|position| position.map_id == map_id)
            .ok_or_else(|| Error::not_found("position", format!("{entity_id} on map {map_id}")))?;

        let map = self.store.get_map(map_id)?;
        if !map.contains(position.longitude, position.latitude) {
            warn!("Position of {entity_id} lies outside the boundary of map {map_id}");
        }

        let start = self
            .nearest_node(map_id, position.longitude, position.latitude, None)?
            .ok_or_else(|| {
                Error::not_found(
                    "node",
                    format!(
                        "within {} of ({}, {})",
                        self.config.nearest_node_radius, position.longitude, position.latitude
                    ),
                )
            })?;
        debug!("Snapped {entity_id} to node {}", start.id);

        self.compute_route(map_id, start.id, to_node_id, route_type, requested_by)
    }

    /// Nearest node to a geographic point; `radius` defaults to the configured one
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the map does not exist
    pub fn nearest_node(
        &self,
        map_id: MapId,
        longitude: f64,
        latitude: f64,
        radius: Option<f64>,
    ) -> Result<Option<Node>, Error> {
        let radius = radius.unwrap_or(self.config.nearest_node_radius);
        self.store.find_nearest_node(map_id, longitude, latitude, radius)
    }

    fn scoped(&self, cancel: &CancellationToken) -> CancellationToken {
        match self.config.search_timeout() {
            Some(timeout) => cancel.limited_to(timeout),
            None => cancel.clone(),
        }
    }

    fn active_map(&self, map_id: MapId) -> Result<IndoorMap, Error> {
        let map = self.store.get_map(map_id)?;
        if !map.active {
            return Err(Error::InvalidArgument(format!("map {map_id} is not active")));
        }
        Ok(map)
    }

    fn persist(
        &self,
        graph: &RouteGraph,
        path: &SearchPath,
        route_type: RouteType,
        requested_by: &str,
    ) -> Result<Route, Error> {
        let route = self.assemble(graph, path, route_type, requested_by)?;
        self.store.save_route(&route)?;
        info!(
            "Saved {} route {} ({}): {} nodes, {:.1} units, ~{}s",
            route.route_type,
            route.id,
            route.name,
            route.path.len(),
            route.total_distance,
            route.estimated_time
        );
        Ok(route)
    }

    /// Packages a search result into a new, immutable route
    fn assemble(
        &self,
        graph: &RouteGraph,
        path: &SearchPath,
        route_type: RouteType,
        requested_by: &str,
    ) -> Result<Route, Error> {
        let nodes = path
            .nodes
            .iter()
            .map(|id| graph.node(*id))
            .collect::<Result<Vec<&Node>, _>>()?;

        let total_distance = self.metrics.path_distance(path);
        let (waypoints, instructions) = synthesize(&nodes);
        let from = nodes[0];
        let to = nodes[nodes.len() - 1];

        Ok(Route {
            id: RouteId::new_v4(),
            name: format!("{} to {}", from.label(), to.label()),
            map_id: graph.map().id,
            from_node: from.id,
            to_node: to.id,
            path: path.nodes.clone(),
            route_type,
            total_distance,
            estimated_time: self.metrics.estimated_time(total_distance),
            difficulty: RouteMetrics::difficulty(&nodes),
            accessible: RouteMetrics::is_accessible(&nodes),
            emergency: route_type == RouteType::EmergencyEvacuation,
            restricted: false,
            waypoints,
            instructions,
            created_by: requested_by.to_string(),
            created_at: Utc::now(),
        })
    }
}
