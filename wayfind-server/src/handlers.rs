use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};
use wayfind_core::{
    CancellationToken, EntityType, GraphStore, MapId, NodeId, Position, Route, RouteId,
    RouteRequest, RouteType,
};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    GeoJson,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Deserialize)]
pub struct RouteBody {
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub route_type: String,
    pub requested_by: String,
}

#[derive(Debug, Deserialize)]
pub struct EvacuationBody {
    pub from_node_id: NodeId,
    pub requested_by: String,
}

#[derive(Debug, Deserialize)]
pub struct PositionRouteBody {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub to_node_id: NodeId,
    pub route_type: String,
    pub requested_by: String,
}

#[derive(Debug, Deserialize)]
pub struct NearestNodeQuery {
    pub longitude: f64,
    pub latitude: f64,
    pub radius: Option<f64>,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "wayfind-server",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

pub async fn compute_route(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<MapId>,
    Query(query): Query<FormatQuery>,
    Json(body): Json<RouteBody>,
) -> Result<Response, ApiError> {
    let request = RouteRequest {
        map_id,
        from_node_id: body.from_node_id,
        to_node_id: body.to_node_id,
        route_type: body.route_type.parse::<RouteType>()?,
        requested_by: body.requested_by,
    };
    debug!(
        "Route request on map {map_id}: {} -> {} ({})",
        request.from_node_id, request.to_node_id, request.route_type
    );

    // Dropping the guard on timeout cancels the search
    let cancel = CancellationToken::new();
    let _guard = CancelOnDrop(cancel.clone());
    let route = tokio::task::spawn_blocking(move || {
        state.assembler.compute_route_with(&request, &cancel)
    })
    .await??;

    render(route, query.format)
}

pub async fn compute_evacuation(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<MapId>,
    Query(query): Query<FormatQuery>,
    Json(body): Json<EvacuationBody>,
) -> Result<Response, ApiError> {
    let route = tokio::task::spawn_blocking(move || {
        state
            .assembler
            .compute_evacuation_route(map_id, body.from_node_id, &body.requested_by)
    })
    .await??;
    info!("Evacuation route {} issued on map {map_id}", route.id);

    render(route, query.format)
}

pub async fn compute_route_from_position(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<MapId>,
    Query(query): Query<FormatQuery>,
    Json(body): Json<PositionRouteBody>,
) -> Result<Response, ApiError> {
    let route_type = body.route_type.parse::<RouteType>()?;
    let route = tokio::task::spawn_blocking(move || {
        state.assembler.compute_route_from_position(
            map_id,
            body.entity_type,
            &body.entity_id,
            body.to_node_id,
            route_type,
            &body.requested_by,
        )
    })
    .await??;

    render(route, query.format)
}

pub async fn nearest_node(
    State(state): State<Arc<AppState>>,
    Path(map_id): Path<MapId>,
    Query(query): Query<NearestNodeQuery>,
) -> Result<Response, ApiError> {
    let node = state
        .assembler
        .nearest_node(map_id, query.longitude, query.latitude, query.radius)?;

    Ok(match node {
        Some(node) => Json(node).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "no node within radius" })),
        )
            .into_response(),
    })
}

pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(route_id): Path<RouteId>,
    Query(query): Query<FormatQuery>,
) -> Result<Response, ApiError> {
    let route = state.store().get_route(route_id)?;
    render(route, query.format)
}

pub async fn record_position(
    State(state): State<Arc<AppState>>,
    Json(position): Json<Position>,
) -> Result<StatusCode, ApiError> {
    state.store().record_position(position)?;
    Ok(StatusCode::NO_CONTENT)
}

fn render(route: Route, format: OutputFormat) -> Result<Response, ApiError> {
    Ok(match format {
        OutputFormat::Json => Json(route).into_response(),
        OutputFormat::GeoJson => Json(route.to_geojson()?).into_response(),
    })
}

struct CancelOnDrop(CancellationToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
