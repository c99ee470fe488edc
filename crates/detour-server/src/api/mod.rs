//! API routes for the detour server.

pub mod blockages;
mod routes;

use axum::{http::StatusCode, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

pub type ApiError = (StatusCode, Json<Value>);

pub fn routes() -> Router<Arc<AppState>> {
    routes::create_router()
}

pub(crate) fn bad_request(error: &str, details: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "details": details.to_string() })),
    )
}

pub(crate) fn not_found(error: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": error })))
}

#[cfg(test)]
mod tests;
