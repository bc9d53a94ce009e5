//! Edge admissibility per route type

use crate::model::{Edge, RouteType};

/// Pure predicate deciding whether a search may traverse an edge
pub type Admissibility = fn(&Edge) -> bool;

fn open_edge(edge: &Edge) -> bool {
    !edge.restricted
}

fn accessible_edge(edge: &Edge) -> bool {
    open_edge(edge) && edge.accessible
}

fn emergency_edge(edge: &Edge) -> bool {
    open_edge(edge) && edge.emergency_route
}

impl RouteType {
    pub fn admissibility(self) -> Admissibility {
        match self {
            Self::Shortest => open_edge,
            Self::AccessiblePath => accessible_edge,
            Self::EmergencyEvacuation => emergency_edge,
        }
    }

    pub fn admits(self, edge: &Edge) -> bool {
        (self.admissibility())(edge)
    }
}
