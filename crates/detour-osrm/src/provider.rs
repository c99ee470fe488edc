//! Route source backed by OSRM mirrors with a synthetic fallback.

use crate::client::{MirrorStatus, OsrmClient, OsrmConfig};
use detour_core::synthetic::{synthesize_route, DEFAULT_SYNTHETIC_SPEED_KMH};
use detour_core::{control_points, PathPoint, ProviderError, RouteResponse, RouteSource};
use std::future::Future;
use tracing::{debug, warn};

/// Mirrors first, synthetic geometry when none answers.
///
/// The only error this source returns is [`ProviderError::Degenerate`].
pub struct RouteProvider {
    client: OsrmClient,
    synthetic_speed_kmh: f64,
}

impl RouteProvider {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: OsrmClient::new(config)?,
            synthetic_speed_kmh: DEFAULT_SYNTHETIC_SPEED_KMH,
        })
    }

    pub fn with_synthetic_speed(mut self, speed_kmh: f64) -> Self {
        self.synthetic_speed_kmh = speed_kmh;
        self
    }

    pub fn mirror_status(&self) -> Vec<MirrorStatus> {
        self.client.mirror_status()
    }

    async fn route(
        &self,
        control: Vec<PathPoint>,
        has_waypoints: bool,
    ) -> Result<RouteResponse, ProviderError> {
        match self.client.fetch(&control).await {
            Ok(mut routes) => {
                if !has_waypoints && routes.len() > 1 {
                    debug!("Routing service returned {} alternatives", routes.len());
                    return Ok(RouteResponse::Alternatives(routes));
                }
                // fetch never returns an empty list
                let first = routes.swap_remove(0);
                Ok(RouteResponse::Single(first))
            }
            Err(err) => {
                warn!("{}; generating offline route", err);
                synthesize_route(&control, self.synthetic_speed_kmh).map(RouteResponse::Single)
            }
        }
    }
}

impl RouteSource for RouteProvider {
    fn get_route(
        &self,
        start: PathPoint,
        end: PathPoint,
        waypoints: &[PathPoint],
    ) -> impl Future<Output = Result<RouteResponse, ProviderError>> + Send {
        self.route(control_points(start, end, waypoints), !waypoints.is_empty())
    }

    fn name(&self) -> &str {
        "OSRM with offline fallback"
    }
}
