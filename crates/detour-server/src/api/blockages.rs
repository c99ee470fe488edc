//! Blockage API endpoints.
//!
//! CRUD over the in-memory blockage list plus an ad-hoc conflict check.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::{bad_request, not_found, ApiError};
use crate::state::{AppState, BlockageRecord};
use detour_core::{ConflictDetector, ConflictReport, CreateBlockageRequest, PathPoint};

/// Create a new blockage.
pub async fn create_blockage(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBlockageRequest>,
) -> Result<(StatusCode, Json<BlockageRecord>), ApiError> {
    let blockage = req
        .into_blockage()
        .map_err(|err| bad_request("Invalid blockage", err))?;

    let record = state.add_blockage(blockage);
    tracing::info!(
        "Added blockage '{}' ({}) radius {:.0}m",
        record.blockage.description,
        record.id,
        record.blockage.radius_m
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// List all blockages in insertion order.
pub async fn list_blockages(State(state): State<Arc<AppState>>) -> Json<Vec<BlockageRecord>> {
    Json(state.list_blockages())
}

pub async fn get_blockage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BlockageRecord>, ApiError> {
    state
        .get_blockage(&id)
        .map(Json)
        .ok_or_else(|| not_found("Blockage not found"))
}

/// Delete a blockage by ID.
pub async fn delete_blockage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.remove_blockage(&id) {
        tracing::info!("Removed blockage {}", id);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearBlockagesResponse {
    pub removed: usize,
}

pub async fn clear_blockages(State(state): State<Arc<AppState>>) -> Json<ClearBlockagesResponse> {
    let removed = state.clear_blockages();
    tracing::info!("Cleared {} blockages", removed);
    Json(ClearBlockagesResponse { removed })
}

#[derive(Debug, Deserialize)]
pub struct ConflictCheckRequest {
    pub points: Vec<PathPoint>,
}

/// Check an arbitrary path against the stored blockages.
pub async fn check_conflicts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictReport>, ApiError> {
    if let Some(bad) = req
        .points
        .iter()
        .find(|p| !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lon))
    {
        return Err(bad_request(
            "Invalid path",
            format!("point ({}, {}) is out of range", bad.lat, bad.lon),
        ));
    }

    let detector = ConflictDetector::from_rules(state.planner().rules());
    let blockages = state.blockage_snapshot();
    Ok(Json(detector.detect(&req.points, &blockages)))
}
