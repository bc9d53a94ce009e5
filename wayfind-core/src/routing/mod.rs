//! Path search and route assembly

pub mod assembler;
pub mod cancellation;
pub mod dijkstra;
pub mod instructions;
pub mod metrics;
pub mod policy;
mod to_geojson;

pub use assembler::{RouteAssembler, RouteRequest};
pub use cancellation::CancellationToken;
pub use dijkstra::{SearchPath, find_path, find_path_to_any};
pub use instructions::synthesize;
pub use metrics::RouteMetrics;
