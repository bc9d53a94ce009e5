use hashbrown::HashMap;
use log::{debug, warn};
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
};

use crate::{
    Error, GraphStore, MapId, NodeId,
    model::{Edge, IndoorMap, Node},
    store::MapSnapshot,
};

/// Petgraph edge weight: which edge record is traversed, and in which direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    /// Index into the graph's edge records
    pub edge: usize,
    /// `true` when a bidirectional edge is walked `to` → `from`
    pub reversed: bool,
}

/// In-memory navigable graph of one floor
#[derive(Debug, Clone)]
pub struct RouteGraph {
    map: IndoorMap,
    pub(crate) graph: DiGraph<Node, Traversal>,
    edges: Vec<Edge>,
    index: HashMap<NodeId, NodeIndex>,
}

impl RouteGraph {
    /// Builds the graph of `map_id` from one store snapshot
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the map does not exist
    pub fn load<S: GraphStore + ?Sized>(store: &S, map_id: MapId) -> Result<Self, Error> {
        Ok(Self::from_snapshot(store.map_snapshot(map_id)?))
    }

    pub fn from_snapshot(snapshot: MapSnapshot) -> Self {
        let MapSnapshot { map, nodes, edges } = snapshot;

        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len() * 2);
        let mut index = HashMap::with_capacity(nodes.len());

        for node in nodes {
            if node.map_id != map.id {
                warn!("Skipping node {} of map {} in snapshot of {}", node.id, node.map_id, map.id);
                continue;
            }
            let id = node.id;
            index.insert(id, graph.add_node(node));
        }

        let mut kept = Vec::with_capacity(edges.len());
        for edge in edges {
            let (Some(&from), Some(&to)) = (index.get(&edge.from_node), index.get(&edge.to_node))
            else {
                warn!(
                    "Skipping edge {}: endpoints {} -> {} are not both on map {}",
                    edge.id, edge.from_node, edge.to_node, map.id
                );
                continue;
            };

            let position = kept.len();
            graph.add_edge(from, to, Traversal { edge: position, reversed: false });
            if edge.bidirectional && from != to {
                graph.add_edge(to, from, Traversal { edge: position, reversed: true });
            }
            kept.push(edge);
        }

        debug!(
            "Built route graph for map {}: {} nodes, {} traversals",
            map.id,
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            map,
            graph,
            edges: kept,
            index,
        }
    }

    pub fn map(&self) -> &IndoorMap {
        &self.map
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the node is not on this map
    pub fn node(&self, node_id: NodeId) -> Result<&Node, Error> {
        self.node_index(node_id).map(|idx| &self.graph[idx])
    }

    pub(crate) fn node_index(&self, node_id: NodeId) -> Result<NodeIndex, Error> {
        self.index
            .get(&node_id)
            .copied()
            .ok_or_else(|| Error::not_found("node", node_id))
    }

    pub(crate) fn node_at(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    pub(crate) fn edge_record(&self, traversal: Traversal) -> &Edge {
        &self.edges[traversal.edge]
    }

    pub(crate) fn traversal(&self, idx: EdgeIndex) -> Traversal {
        self.graph[idx]
    }

    /// Edges departing `node_id`. Bidirectional edges arriving at the node
    /// are returned reversed, so every result has `from_node == node_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node is not on this map
    pub fn outgoing_edges(&self, node_id: NodeId) -> Result<Vec<Edge>, Error> {
        let idx = self.node_index(node_id)?;
        let mut outgoing: Vec<Edge> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge_ref| {
                let traversal = *edge_ref.weight();
                let record = self.edge_record(traversal);
                if traversal.reversed {
                    record.reversed()
                } else {
                    record.clone()
                }
            })
            .collect();
        // petgraph yields the most recently added edge first
        outgoing.reverse();
        Ok(outgoing)
    }

    /// Cheapest edge record usable from `from` directly to `to`, if any
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        let (from_idx, to_idx) = (self.index.get(&from)?, self.index.get(&to)?);
        self.graph
            .edges_connecting(*from_idx, *to_idx)
            .map(|edge_ref| self.edge_record(*edge_ref.weight()))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Nodes flagged as emergency exits
    pub fn emergency_exits(&self) -> Vec<NodeId> {
        self.graph
            .node_weights()
            .filter(|node| node.emergency_exit)
            .map(|node| node.id)
            .collect()
    }
}
