//! Route source abstraction.
//!
//! A route source turns an ordered list of control points into road-following
//! geometry. The OSRM mirror client implements it in `detour-osrm`; the
//! synthetic generator in [`crate::synthetic`] implements it offline.

use crate::models::{PathPoint, RoutedPath};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Network failure, timeout or non-success status from one endpoint
    #[error("transient routing failure: {0}")]
    Transient(String),
    /// The endpoint answered but the body was not a usable route
    #[error("malformed routing response: {0}")]
    InvalidResponse(String),
    /// Every configured endpoint failed or was backing off
    #[error("all routing endpoints exhausted")]
    Exhausted,
    /// All control points coincide, there is nothing to route
    #[error("cannot build a route between coincident points")]
    Degenerate,
}

/// What a route source returned for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResponse {
    Single(RoutedPath),
    /// Several routes for a waypoint-free request, in service order
    Alternatives(Vec<RoutedPath>),
}

impl RouteResponse {
    /// The route to use when only one is wanted.
    pub fn primary(&self) -> Option<&RoutedPath> {
        match self {
            RouteResponse::Single(path) => Some(path),
            RouteResponse::Alternatives(paths) => paths.first(),
        }
    }

    pub fn into_primary(self) -> Option<RoutedPath> {
        match self {
            RouteResponse::Single(path) => Some(path),
            RouteResponse::Alternatives(paths) => paths.into_iter().next(),
        }
    }

    pub fn into_paths(self) -> Vec<RoutedPath> {
        match self {
            RouteResponse::Single(path) => vec![path],
            RouteResponse::Alternatives(paths) => paths,
        }
    }
}

/// Build `[start, waypoints..., end]`.
pub fn control_points(start: PathPoint, end: PathPoint, waypoints: &[PathPoint]) -> Vec<PathPoint> {
    let mut points = Vec::with_capacity(waypoints.len() + 2);
    points.push(start);
    points.extend_from_slice(waypoints);
    points.push(end);
    points
}

/// Async source of road-following routes.
pub trait RouteSource: Send + Sync {
    /// Route from `start` through `waypoints` (in order) to `end`.
    ///
    /// Sources that can return several routes do so only when `waypoints`
    /// is empty.
    fn get_route(
        &self,
        start: PathPoint,
        end: PathPoint,
        waypoints: &[PathPoint],
    ) -> impl Future<Output = Result<RouteResponse, ProviderError>> + Send;

    /// Name used in logs.
    fn name(&self) -> &str;
}

impl<S: RouteSource> RouteSource for Arc<S> {
    fn get_route(
        &self,
        start: PathPoint,
        end: PathPoint,
        waypoints: &[PathPoint],
    ) -> impl Future<Output = Result<RouteResponse, ProviderError>> + Send {
        self.as_ref().get_route(start, end, waypoints)
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }
}
