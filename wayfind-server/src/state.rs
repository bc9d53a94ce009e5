use std::sync::Arc;

use wayfind_core::{Error, InMemoryGraphStore, RouteAssembler, RoutingConfig};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub assembler: RouteAssembler<InMemoryGraphStore>,
}

impl AppState {
    pub fn new(store: Arc<InMemoryGraphStore>, routing: RoutingConfig) -> Result<Self, Error> {
        Ok(Self {
            assembler: RouteAssembler::new(store, routing)?,
        })
    }

    pub fn store(&self) -> &InMemoryGraphStore {
        self.assembler.store()
    }
}
