use std::{fs::File, io::BufReader, path::Path};

use hashbrown::HashSet;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    Error, InMemoryGraphStore,
    model::{Edge, IndoorMap, Node},
};

/// One map together with all of its nodes and edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub map: IndoorMap,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FloorPlan {
    /// Checks the structural invariants of the plan
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` describing the first violation found
    pub fn validate(&self) -> Result<(), Error> {
        let map_id = self.map.id;
        let mut node_ids = HashSet::with_capacity(self.nodes.len());

        for node in &self.nodes {
            if node.map_id != map_id {
                return Err(Error::InvalidData(format!(
                    "node {} belongs to map {}, expected {map_id}",
                    node.id, node.map_id
                )));
            }
            if !node_ids.insert(node.id) {
                return Err(Error::InvalidData(format!("duplicate node id {}", node.id)));
            }
        }

        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            if !edge_ids.insert(edge.id) {
                return Err(Error::InvalidData(format!("duplicate edge id {}", edge.id)));
            }
            if edge.map_id != map_id {
                return Err(Error::InvalidData(format!(
                    "edge {} belongs to map {}, expected {map_id}",
                    edge.id, edge.map_id
                )));
            }
            for endpoint in [edge.from_node, edge.to_node] {
                if !node_ids.contains(&endpoint) {
                    return Err(Error::InvalidData(format!(
                        "edge {} references unknown node {endpoint}",
                        edge.id
                    )));
                }
            }
            if !(edge.distance.is_finite() && edge.distance >= 0.0) {
                return Err(Error::InvalidData(format!(
                    "edge {} has invalid distance {}",
                    edge.id, edge.distance
                )));
            }
            if !(edge.weight.is_finite() && edge.weight >= 0.0) {
                return Err(Error::InvalidData(format!(
                    "edge {} has invalid weight {}",
                    edge.id, edge.weight
                )));
            }
        }

        Ok(())
    }
}

/// Reads and validates a floor-plan JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or fails validation
pub fn load_floor_plan(path: &Path) -> Result<FloorPlan, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open floor plan '{}': {e}", path.display()),
        )
    })?;
    let plan: FloorPlan = serde_json::from_reader(BufReader::new(file))?;
    plan.validate()?;
    Ok(plan)
}

/// Loads every `*.json` floor plan in `dir` into `store`.
/// Returns the number of maps loaded.
///
/// # Errors
///
/// Fails on the first unreadable or invalid document
pub fn load_floor_plans(dir: &Path, store: &InMemoryGraphStore) -> Result<usize, Error> {
    if !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Floor plan directory not found: {}", dir.display()),
        )));
    }

    let mut paths = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    if paths.is_empty() {
        warn!("No floor plans found in {}", dir.display());
    }

    for path in &paths {
        info!("Loading floor plan {}", path.display());
        store.insert_floor_plan(load_floor_plan(path)?)?;
    }

    Ok(paths.len())
}
