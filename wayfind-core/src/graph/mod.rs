//! Route graph model
//!
//! Directed view of one map's nodes and edges, built from a single store
//! snapshot so a search never observes concurrent edits.

mod route_graph;

pub use route_graph::{RouteGraph, Traversal};
