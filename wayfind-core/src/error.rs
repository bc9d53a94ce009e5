use thiserror::Error;

use crate::{NodeId, model::RouteType};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No {route_type} route from {from} to {}", target_label(.to))]
    RouteNotFound {
        from: NodeId,
        /// `None` when searching toward any emergency exit
        to: Option<NodeId>,
        route_type: RouteType,
    },
    #[error("Route search cancelled")]
    Cancelled,
    #[error("Graph store error: {0}")]
    Store(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

fn target_label(to: &Option<NodeId>) -> String {
    to.map_or_else(|| "any emergency exit".to_string(), |id| id.to_string())
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
