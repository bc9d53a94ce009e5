//! Distance, time and difficulty of a path

use itertools::Itertools;
use log::warn;

use crate::{
    DEFAULT_AVERAGE_SPEED, NodeId,
    graph::RouteGraph,
    model::{DifficultyLevel, Node},
    routing::SearchPath,
};

/// Summary statistics over node sequences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    /// Distance units per second
    pub average_speed: f64,
}

impl Default for RouteMetrics {
    fn default() -> Self {
        Self {
            average_speed: DEFAULT_AVERAGE_SPEED,
        }
    }
}

impl RouteMetrics {
    pub fn new(average_speed: f64) -> Self {
        Self { average_speed }
    }

    /// Length of the edges a search actually traversed
    pub fn path_distance(&self, path: &SearchPath) -> f64 {
        path.distance()
    }

    /// Sum of edge distances between consecutive nodes.
    ///
    /// A pair with no connecting edge record is a data inconsistency: it is
    /// logged and measured as the straight line between the two nodes.
    /// Unknown nodes contribute nothing.
    pub fn total_distance(&self, graph: &RouteGraph, path: &[NodeId]) -> f64 {
        path.iter()
            .tuple_windows()
            .map(|(&from, &to)| {
                if let Some(edge) = graph.edge_between(from, to) {
                    return edge.distance;
                }
                match (graph.node(from), graph.node(to)) {
                    (Ok(a), Ok(b)) => {
                        warn!(
                            "Data inconsistency: no edge between adjacent path nodes {from} and {to}, \
                            using straight-line distance"
                        );
                        a.planar_distance(b)
                    }
                    _ => {
                        warn!("Data inconsistency: path node {from} or {to} missing from map");
                        0.0
                    }
                }
            })
            .sum()
    }

    /// Traversal time in whole seconds at the average speed
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimated_time(&self, total_distance: f64) -> u64 {
        (total_distance / self.average_speed).round().max(0.0) as u64
    }

    pub fn difficulty(path: &[&Node]) -> DifficultyLevel {
        let stairs = path.iter().any(|node| node.stairs);
        let elevator = path.iter().any(|node| node.elevator);
        match (stairs, elevator) {
            (true, false) => DifficultyLevel::Difficult,
            (true, true) => DifficultyLevel::Moderate,
            _ => DifficultyLevel::Easy,
        }
    }

    pub fn is_accessible(path: &[&Node]) -> bool {
        path.iter().all(|node| node.accessible)
    }
}
