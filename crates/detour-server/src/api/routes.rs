//! REST API routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{bad_request, blockages, not_found, ApiError};
use crate::route_planner::{PlanError, PlanOptions};
use crate::state::AppState;
use detour_core::{Location, RouteResult, RoutedPath};
use detour_osrm::MirrorStatus;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/v1/blockages",
            post(blockages::create_blockage)
                .get(blockages::list_blockages)
                .delete(blockages::clear_blockages),
        )
        .route(
            "/v1/blockages/:id",
            get(blockages::get_blockage).delete(blockages::delete_blockage),
        )
        .route("/v1/conflicts/check", post(blockages::check_conflicts))
        .route("/v1/geocode", get(geocode))
        .route("/v1/routes/direct", post(direct_route))
        .route("/v1/routes/plan", post(plan_route))
}

// === Request/Response types ===

/// An endpoint given either as coordinates or as a place name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Point {
        lat: f64,
        lon: f64,
        #[serde(default)]
        name: Option<String>,
    },
    Query(String),
}

#[derive(Debug, Deserialize)]
pub struct DirectRouteRequest {
    pub start: LocationInput,
    pub end: LocationInput,
}

#[derive(Debug, Serialize)]
pub struct DirectRouteResponse {
    pub start: Location,
    pub end: Location,
    #[serde(flatten)]
    pub route: RoutedPath,
}

#[derive(Debug, Deserialize)]
pub struct PlanRouteRequest {
    pub start: LocationInput,
    pub end: LocationInput,
    #[serde(default)]
    pub ignore_obstacles: bool,
    /// Overrides the server's search deadline
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PlanRouteResponse {
    pub success: bool,
    pub start: Location,
    pub end: Location,
    #[serde(flatten)]
    pub route: RouteResult,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub blockages: usize,
    pub geocode_cache_entries: usize,
    pub mirrors: Vec<MirrorStatus>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub q: String,
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        blockages: state.list_blockages().len(),
        geocode_cache_entries: state.geocoder().cache_len(),
        mirrors: state.planner().source().mirror_status(),
    })
}

async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<Location>, ApiError> {
    if query.q.trim().is_empty() {
        return Err(bad_request("Invalid query", "q must not be empty"));
    }
    state
        .geocoder()
        .resolve(&query.q)
        .await
        .map(Json)
        .ok_or_else(|| not_found("Location not found"))
}

async fn resolve_location(
    state: &AppState,
    input: &LocationInput,
    role: &str,
) -> Result<Location, ApiError> {
    match input {
        LocationInput::Point { lat, lon, name } => {
            let name = name.clone().unwrap_or_else(|| format!("{lat:.5}, {lon:.5}"));
            Location::new(*lat, *lon, name)
                .map_err(|err| bad_request(&format!("Invalid {role} location"), err))
        }
        LocationInput::Query(text) => state.geocoder().resolve(text).await.ok_or_else(|| {
            bad_request(
                &format!("Invalid {role} location"),
                format!("could not find '{}'", text.trim()),
            )
        }),
    }
}

fn plan_failed(err: PlanError) -> ApiError {
    tracing::warn!("Route planning failed: {}", err);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "success": false, "message": err.to_string() })),
    )
}

async fn direct_route(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DirectRouteRequest>,
) -> Result<Json<DirectRouteResponse>, ApiError> {
    let start = resolve_location(&state, &req.start, "start").await?;
    let end = resolve_location(&state, &req.end, "end").await?;

    let route = state
        .planner()
        .direct_route(start.point(), end.point())
        .await
        .map_err(plan_failed)?;
    Ok(Json(DirectRouteResponse { start, end, route }))
}

async fn plan_route(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlanRouteRequest>,
) -> Result<Json<PlanRouteResponse>, ApiError> {
    let start = resolve_location(&state, &req.start, "start").await?;
    let end = resolve_location(&state, &req.end, "end").await?;

    let options = PlanOptions {
        ignore_obstacles: req.ignore_obstacles,
        deadline: req
            .deadline_ms
            .map(Duration::from_millis)
            .or_else(|| state.config().avoidance_deadline()),
    };
    let blockages = state.blockage_snapshot();
    let cancel = state.shutdown_token().child_token();

    tracing::info!(
        "Planning route {} -> {} around {} blockages",
        start.name,
        end.name,
        blockages.len()
    );
    let route = state
        .planner()
        .plan(start.point(), end.point(), blockages, &options, &cancel)
        .await
        .map_err(plan_failed)?;

    Ok(Json(PlanRouteResponse {
        success: true,
        start,
        end,
        route,
    }))
}
