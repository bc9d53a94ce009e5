use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wayfind_core::{InMemoryGraphStore, load_floor_plans};
use wayfind_server::{AppState, Cli, ServerConfig, router};

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = ServerConfig::resolve(&cli)?;
    init_tracing(&config.log_filter);

    let store = Arc::new(InMemoryGraphStore::with_route_capacity(config.route_capacity));
    match &config.floor_plans {
        Some(dir) => {
            let loaded = load_floor_plans(dir, &store)?;
            info!("Loaded {loaded} floor plan(s) from {}", dir.display());
        }
        None => warn!("No floor plan directory configured, starting with an empty store"),
    }

    let state = Arc::new(AppState::new(store, config.routing())?);
    let app = router(state, &config);

    let listener = TcpListener::bind(config.bind).await?;
    info!("Wayfinding service listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
