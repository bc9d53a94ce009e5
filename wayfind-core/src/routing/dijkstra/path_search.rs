use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::{HashMap, hash_map::Entry};
use log::{debug, trace};
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use super::state::State;
use crate::{
    CANCELLATION_CHECK_INTERVAL, Error, NodeId,
    graph::RouteGraph,
    model::{Edge, RouteType},
    routing::{CancellationToken, policy::Admissibility},
};

/// Minimum-cost path found by a search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPath {
    /// Node sequence, both endpoints included
    pub nodes: Vec<NodeId>,
    /// Edge traversed between `nodes[i]` and `nodes[i + 1]`, oriented in
    /// the direction of travel
    pub edges: Vec<Edge>,
    /// Sum of `distance × weight` over `edges`
    pub cost: f64,
}

impl SearchPath {
    fn identity(node: NodeId) -> Self {
        Self {
            nodes: vec![node],
            edges: Vec::new(),
            cost: 0.0,
        }
    }

    /// Physical length of the path
    pub fn distance(&self) -> f64 {
        self.edges.iter().map(|edge| edge.distance).sum()
    }

    pub fn source(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn target(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }
}

/// Dijkstra search from `from` to `to` over edges admitted by `route_type`
///
/// # Errors
///
/// - `NotFound` if either node is not on the graph's map
/// - `RouteNotFound` if no admissible path exists
/// - `Cancelled` if the token fires during the search
pub fn find_path(
    graph: &RouteGraph,
    from: NodeId,
    to: NodeId,
    route_type: RouteType,
    cancel: &CancellationToken,
) -> Result<SearchPath, Error> {
    graph.node_index(to)?;
    find_path_to_any(graph, from, &[to], route_type, cancel)?.ok_or(Error::RouteNotFound {
        from,
        to: Some(to),
        route_type,
    })
}

/// Dijkstra search from `from` to whichever of `targets` is cheapest to reach.
/// Returns `None` when no target is reachable through admissible edges.
///
/// # Errors
///
/// - `NotFound` if `from` or any target is not on the graph's map
/// - `Cancelled` if the token fires during the search
pub fn find_path_to_any(
    graph: &RouteGraph,
    from: NodeId,
    targets: &[NodeId],
    route_type: RouteType,
    cancel: &CancellationToken,
) -> Result<Option<SearchPath>, Error> {
    let start = graph.node_index(from)?;
    let mut target_set = FixedBitSet::with_capacity(graph.node_count());
    for target in targets {
        target_set.insert(graph.node_index(*target)?.index());
    }

    if target_set.contains(start.index()) {
        return Ok(Some(SearchPath::identity(from)));
    }
    cancel.check()?;

    debug!(
        "Searching {route_type} path from {from} over {} nodes toward {} target(s)",
        graph.node_count(),
        targets.len()
    );

    let search = dijkstra(graph, start, &target_set, route_type.admissibility(), cancel)?;
    let Some((reached, cost)) = search.reached else {
        debug!("No {route_type} path from {from}");
        return Ok(None);
    };

    let path = reconstruct(graph, start, reached, cost, &search.predecessors);
    trace!(
        "Found {route_type} path {from} -> {} with {} nodes, cost {cost:.2}",
        path.target(),
        path.nodes.len()
    );
    Ok(Some(path))
}

struct Search {
    reached: Option<(NodeIndex, f64)>,
    predecessors: HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
}

/// Search state is local to the call; nothing is shared between requests
fn dijkstra(
    graph: &RouteGraph,
    start: NodeIndex,
    targets: &FixedBitSet,
    admissible: Admissibility,
    cancel: &CancellationToken,
) -> Result<Search, Error> {
    let node_count = graph.node_count();
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(node_count.min(1024));
    let mut predecessors: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> =
        HashMap::with_capacity(node_count.min(1024));
    let mut settled = FixedBitSet::with_capacity(node_count);
    let mut heap = BinaryHeap::with_capacity(node_count.min(1024) / 4);
    let mut seq = 0_u64;
    let mut pops = 0_usize;

    heap.push(State {
        cost: 0.0,
        seq,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node, .. }) = heap.pop() {
        pops += 1;
        if pops % CANCELLATION_CHECK_INTERVAL == 0 {
            cancel.check()?;
        }

        // Stale entry, node already settled with a lower cost
        if settled.put(node.index()) {
            continue;
        }

        if targets.contains(node.index()) {
            return Ok(Search {
                reached: Some((node, cost)),
                predecessors,
            });
        }

        for edge_ref in graph.graph.edges(node) {
            let next = edge_ref.target();
            if settled.contains(next.index()) {
                continue;
            }

            let record = graph.edge_record(*edge_ref.weight());
            if !admissible(record) {
                continue;
            }

            let next_cost = cost + record.cost();
            let improved = match distances.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    true
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        true
                    } else {
                        false
                    }
                }
            };

            if improved {
                seq += 1;
                heap.push(State {
                    cost: next_cost,
                    seq,
                    node: next,
                });
                predecessors.insert(next, (node, edge_ref.id()));
            }
        }
    }

    Ok(Search {
        reached: None,
        predecessors,
    })
}

fn reconstruct(
    graph: &RouteGraph,
    start: NodeIndex,
    reached: NodeIndex,
    cost: f64,
    predecessors: &HashMap<NodeIndex, (NodeIndex, EdgeIndex)>,
) -> SearchPath {
    let mut nodes = vec![graph.node_at(reached).id];
    let mut edges = Vec::new();

    // Follow predecessors backward from target to start
    let mut current = reached;
    while current != start {
        let Some(&(prev, via)) = predecessors.get(&current) else {
            break;
        };
        let traversal = graph.traversal(via);
        let record = graph.edge_record(traversal);
        edges.push(if traversal.reversed {
            record.reversed()
        } else {
            record.clone()
        });
        nodes.push(graph.node_at(prev).id);
        current = prev;
    }

    nodes.reverse();
    edges.reverse();
    SearchPath { nodes, edges, cost }
}
