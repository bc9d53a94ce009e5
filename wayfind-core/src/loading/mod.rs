//! This module is responsible for loading floor-plan documents
//! and validating them before they reach a graph store.

mod floor_plan;

pub use floor_plan::{FloorPlan, load_floor_plan, load_floor_plans};
