//! Deterministic synthetic route geometry.
//!
//! Used when no routing service answers. Each leg between consecutive
//! control points is densified and given a small, fixed sinusoidal wobble so
//! that the result looks road-like while staying reproducible.

use crate::models::{PathPoint, RoutedPath};
use crate::provider::{control_points, ProviderError, RouteResponse, RouteSource};
use crate::spatial::distance_km;
use std::f64::consts::PI;
use std::future::Future;

pub const SYNTHETIC_SERVICE_NAME: &str = "Offline";
pub const DEFAULT_SYNTHETIC_SPEED_KMH: f64 = 40.0;

const MIN_INTERVALS_PER_LEG: usize = 8;
const INTERVALS_PER_KM: f64 = 2.0;
const CURVE_DEG_PER_KM: f64 = 0.0002;
const LAT_WAVE: f64 = 2.1;
const LON_WAVE: f64 = 1.8;

/// Densify `control` into a synthetic route.
///
/// Errors with [`ProviderError::Degenerate`] when every control point
/// coincides (or fewer than two are given).
pub fn synthesize_route(control: &[PathPoint], speed_kmh: f64) -> Result<RoutedPath, ProviderError> {
    if control.len() < 2 {
        return Err(ProviderError::Degenerate);
    }

    let distance_km_total: f64 = control
        .windows(2)
        .map(|leg| distance_km(leg[0], leg[1]))
        .sum();
    if distance_km_total <= 0.0 {
        return Err(ProviderError::Degenerate);
    }

    let mut points = Vec::new();
    for (leg_index, leg) in control.windows(2).enumerate() {
        let (a, b) = (leg[0], leg[1]);
        let leg_km = distance_km(a, b);
        let intervals = MIN_INTERVALS_PER_LEG.max((leg_km * INTERVALS_PER_KM).floor() as usize);
        let curve = CURVE_DEG_PER_KM * leg_km;

        // Later legs start where the previous one ended.
        let first = if leg_index == 0 { 0 } else { 1 };
        for step in first..=intervals {
            if step == 0 {
                points.push(a);
                continue;
            }
            if step == intervals {
                points.push(b);
                continue;
            }
            let progress = step as f64 / intervals as f64;
            let lat = a.lat + (b.lat - a.lat) * progress + curve * (progress * PI * LAT_WAVE).sin();
            let lon = a.lon + (b.lon - a.lon) * progress + curve * (progress * PI * LON_WAVE).cos();
            points.push(PathPoint::new(lat, lon));
        }
    }

    Ok(RoutedPath {
        points,
        distance_km: distance_km_total,
        duration_min: distance_km_total / speed_kmh * 60.0,
        service_name: SYNTHETIC_SERVICE_NAME.to_string(),
    })
}

/// Route source that never touches the network.
#[derive(Debug, Clone, Copy)]
pub struct OfflineRouter {
    speed_kmh: f64,
}

impl Default for OfflineRouter {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTHETIC_SPEED_KMH)
    }
}

impl OfflineRouter {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl RouteSource for OfflineRouter {
    fn get_route(
        &self,
        start: PathPoint,
        end: PathPoint,
        waypoints: &[PathPoint],
    ) -> impl Future<Output = Result<RouteResponse, ProviderError>> + Send {
        let result = synthesize_route(&control_points(start, end, waypoints), self.speed_kmh)
            .map(RouteResponse::Single);
        async move { result }
    }

    fn name(&self) -> &str {
        SYNTHETIC_SERVICE_NAME
    }
}
