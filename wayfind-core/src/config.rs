use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_AVERAGE_SPEED, Error};

/// Tunables of the routing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Average traversal speed in map distance units per second
    pub average_speed: f64,
    /// Search radius used when snapping a position to the nearest node
    pub nearest_node_radius: f64,
    /// Upper bound on a single path search, in milliseconds
    pub search_timeout_ms: Option<u64>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            average_speed: DEFAULT_AVERAGE_SPEED,
            nearest_node_radius: 25.0,
            search_timeout_ms: None,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.average_speed.is_finite() && self.average_speed > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "average_speed must be a positive number, got {}",
                self.average_speed
            )));
        }
        if !(self.nearest_node_radius.is_finite() && self.nearest_node_radius >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "nearest_node_radius must be non-negative, got {}",
                self.nearest_node_radius
            )));
        }
        Ok(())
    }

    pub fn search_timeout(&self) -> Option<Duration> {
        self.search_timeout_ms.map(Duration::from_millis)
    }
}
