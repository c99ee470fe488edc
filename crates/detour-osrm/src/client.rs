//! HTTP client for OSRM-compatible routing mirrors.

use crate::backoff::Backoff;
use detour_core::{PathPoint, ProviderError, RoutedPath};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

pub const OSRM_SERVICE_NAME: &str = "OSRM";

pub const DEFAULT_MIRRORS: [&str; 2] = [
    "https://router.project-osrm.org",
    "http://router.project-osrm.org",
];

const ROUTE_QUERY: [(&str, &str); 5] = [
    ("overview", "full"),
    ("geometries", "geojson"),
    ("steps", "false"),
    ("alternatives", "true"),
    ("continue_straight", "false"),
];

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Base URLs tried in order
    pub mirrors: Vec<String>,
    pub request_timeout: Duration,
    /// Upper bound on in-flight requests across all mirrors
    pub max_concurrent_requests: usize,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    pub user_agent: String,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            request_timeout: Duration::from_secs(15),
            max_concurrent_requests: 4,
            backoff_base: Duration::from_millis(500),
            backoff_max: Duration::from_secs(30),
            user_agent: format!("detour/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Result of asking one mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorAttempt {
    /// Well-formed answer, routes in service order
    Routes(Vec<RoutedPath>),
    /// Anything else; the next mirror is tried
    Transient(String),
}

/// Health snapshot of one mirror, exposed by the service's health check.
#[derive(Debug, Clone, Serialize)]
pub struct MirrorStatus {
    pub url: String,
    pub ready: bool,
    pub consecutive_failures: u32,
    pub retry_in_ms: u64,
}

#[derive(Debug)]
struct Mirror {
    base_url: String,
    backoff: Mutex<Backoff>,
}

impl Mirror {
    fn backoff(&self) -> MutexGuard<'_, Backoff> {
        // Backoff state stays valid even if a holder panicked.
        self.backoff.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: [lon, lat]
    coordinates: Vec<[f64; 2]>,
}

pub struct OsrmClient {
    http: reqwest::Client,
    mirrors: Vec<Mirror>,
    permits: Semaphore,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        let mirrors = config
            .mirrors
            .iter()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .map(|url| Mirror {
                base_url: url.to_string(),
                backoff: Mutex::new(Backoff::new(config.backoff_base, config.backoff_max)),
            })
            .collect();

        Ok(Self {
            http,
            mirrors,
            permits: Semaphore::new(config.max_concurrent_requests.max(1)),
        })
    }

    pub fn mirror_status(&self) -> Vec<MirrorStatus> {
        self.mirrors
            .iter()
            .map(|mirror| {
                let backoff = mirror.backoff();
                MirrorStatus {
                    url: mirror.base_url.clone(),
                    ready: backoff.ready(),
                    consecutive_failures: backoff.consecutive_failures(),
                    retry_in_ms: backoff.remaining().as_millis() as u64,
                }
            })
            .collect()
    }

    /// Ask every mirror, ready ones first in configured order, then those
    /// still backing off. The first well-formed answer wins.
    pub async fn fetch(&self, control: &[PathPoint]) -> Result<Vec<RoutedPath>, ProviderError> {
        for mirror in self.attempt_order() {
            match self.attempt(mirror, control).await {
                MirrorAttempt::Routes(routes) => {
                    mirror.backoff().record_success();
                    return Ok(routes);
                }
                MirrorAttempt::Transient(reason) => {
                    let delay = mirror.backoff().record_failure();
                    warn!(
                        "Routing mirror {} failed: {} (demoted for {}ms)",
                        mirror.base_url,
                        reason,
                        delay.as_millis()
                    );
                }
            }
        }
        Err(ProviderError::Exhausted)
    }

    /// Mirrors in backoff move behind the ready ones; nothing is skipped.
    fn attempt_order(&self) -> Vec<&Mirror> {
        let (ready, backing_off): (Vec<&Mirror>, Vec<&Mirror>) =
            self.mirrors.iter().partition(|mirror| mirror.backoff().ready());
        if !backing_off.is_empty() {
            debug!(
                "{} of {} mirrors backing off, tried last",
                backing_off.len(),
                self.mirrors.len()
            );
        }
        ready.into_iter().chain(backing_off).collect()
    }

    async fn attempt(&self, mirror: &Mirror, control: &[PathPoint]) -> MirrorAttempt {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return MirrorAttempt::Transient("request limiter closed".to_string()),
        };

        let url = route_url(&mirror.base_url, control);
        let response = match self
            .http
            .get(&url)
            .query(&ROUTE_QUERY)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return MirrorAttempt::Transient(err.to_string()),
        };

        if response.status() != reqwest::StatusCode::OK {
            return MirrorAttempt::Transient(format!("HTTP {}", response.status()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return MirrorAttempt::Transient(err.to_string()),
        };

        match parse_route_body(&body) {
            Ok(routes) => MirrorAttempt::Routes(routes),
            Err(err) => MirrorAttempt::Transient(err.to_string()),
        }
    }
}

/// `{base}/route/v1/driving/{lon,lat;lon,lat;...}`
pub fn route_url(base_url: &str, control: &[PathPoint]) -> String {
    let coords = control
        .iter()
        .map(|p| format!("{},{}", p.lon, p.lat))
        .collect::<Vec<_>>()
        .join(";");
    format!("{}/route/v1/driving/{}", base_url.trim_end_matches('/'), coords)
}

/// Decode an OSRM route response body.
///
/// Requires `code == "Ok"` and at least one route with usable geometry.
pub fn parse_route_body(body: &str) -> Result<Vec<RoutedPath>, ProviderError> {
    let response: OsrmResponse = serde_json::from_str(body)
        .map_err(|err| ProviderError::InvalidResponse(err.to_string()))?;

    if response.code != "Ok" {
        let message = response.message.unwrap_or_default();
        return Err(ProviderError::InvalidResponse(format!(
            "code {} {}",
            response.code, message
        )));
    }

    let routes: Vec<RoutedPath> = response
        .routes
        .into_iter()
        .filter(|route| route.geometry.coordinates.len() >= 2)
        .map(|route| RoutedPath {
            points: route
                .geometry
                .coordinates
                .iter()
                .map(|[lon, lat]| PathPoint::new(*lat, *lon))
                .collect(),
            distance_km: route.distance / 1000.0,
            duration_min: route.duration / 60.0,
            service_name: OSRM_SERVICE_NAME.to_string(),
        })
        .collect();

    if routes.is_empty() {
        return Err(ProviderError::InvalidResponse("no routes".to_string()));
    }
    Ok(routes)
}
