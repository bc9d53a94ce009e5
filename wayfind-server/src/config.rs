use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::Deserialize;
use wayfind_core::{RoutingConfig, store::DEFAULT_ROUTE_CAPACITY};

/// Indoor wayfinding service
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on, overrides the configuration file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Directory of floor-plan JSON documents, overrides the configuration file
    #[arg(long)]
    pub floor_plans: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub floor_plans: Option<PathBuf>,
    /// `tracing` env-filter directive, used when `RUST_LOG` is unset
    pub log_filter: String,
    pub request_timeout_secs: u64,
    pub concurrency_limit: usize,
    /// Computed routes kept in memory for `GET /routes/{route_id}`
    pub route_capacity: usize,
    pub routing: RoutingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            floor_plans: None,
            log_filter: "info".to_string(),
            request_timeout_secs: 30,
            concurrency_limit: 256,
            route_capacity: DEFAULT_ROUTE_CAPACITY,
            routing: RoutingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {e}", path.display()))?;
        Ok(Self::from_toml(&text)?)
    }

    /// Loads the file named on the command line, if any, then applies CLI overrides
    pub fn resolve(cli: &Cli) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(dir) = &cli.floor_plans {
            config.floor_plans = Some(dir.clone());
        }
        Ok(config)
    }

    /// Routing settings, with the search bounded by the request timeout
    /// unless configured explicitly
    pub fn routing(&self) -> RoutingConfig {
        let mut routing = self.routing.clone();
        if routing.search_timeout_ms.is_none() {
            routing.search_timeout_ms = Some(self.request_timeout_secs.saturating_mul(1000));
        }
        routing
    }
}
