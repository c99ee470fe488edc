//! Core data models for the detour engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection reasons for values entering the engine from the outside.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    InvalidLongitude(f64),
    #[error("radius {0} must be a positive number of meters")]
    InvalidRadius(f64),
}

fn validate_coordinates(lat: f64, lon: f64) -> Result<(), ValidationError> {
    // NaN fails both range checks
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ValidationError::InvalidLatitude(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ValidationError::InvalidLongitude(lon));
    }
    Ok(())
}

/// A single (lat, lon) coordinate on a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub lat: f64,
    pub lon: f64,
}

impl PathPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A resolved place, usually produced by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub name: String,
}

impl Location {
    /// Create a location, rejecting out-of-range coordinates.
    pub fn new(lat: f64, lon: f64, name: impl Into<String>) -> Result<Self, ValidationError> {
        validate_coordinates(lat, lon)?;
        Ok(Self {
            lat,
            lon,
            name: name.into(),
        })
    }

    pub fn point(&self) -> PathPoint {
        PathPoint::new(self.lat, self.lon)
    }
}

// ========== BLOCKAGES ==========

/// A circular exclusion zone that routes should avoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blockage {
    pub lat: f64,
    pub lon: f64,
    /// Radius in meters
    #[serde(alias = "radius")]
    pub radius_m: f64,
    pub description: String,
}

impl Blockage {
    /// Create a blockage, rejecting invalid coordinates and non-positive radii.
    pub fn new(
        lat: f64,
        lon: f64,
        radius_m: f64,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        validate_coordinates(lat, lon)?;
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(ValidationError::InvalidRadius(radius_m));
        }
        Ok(Self {
            lat,
            lon,
            radius_m,
            description: description.into(),
        })
    }

    pub fn center(&self) -> PathPoint {
        PathPoint::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBlockageRequest {
    pub lat: f64,
    pub lon: f64,
    #[serde(alias = "radius")]
    pub radius_m: f64,
    pub description: Option<String>,
}

impl CreateBlockageRequest {
    pub fn into_blockage(self) -> Result<Blockage, ValidationError> {
        Blockage::new(
            self.lat,
            self.lon,
            self.radius_m,
            self.description
                .unwrap_or_else(|| "Road blockage".to_string()),
        )
    }
}

// ========== CONFLICTS ==========

/// First sample of a segment found inside a blockage's safety margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictPoint {
    pub segment_index: usize,
    pub point: PathPoint,
    pub blockage: Blockage,
    pub distance_to_center_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub conflict_points: Vec<ConflictPoint>,
    /// Share of path length on conflicting segments, 0-100
    pub conflict_percentage: f64,
    pub total_length_m: f64,
    pub conflict_length_m: f64,
    pub total_points: usize,
}

impl ConflictReport {
    /// Report for a path that touches no blockage.
    pub fn clear(total_points: usize) -> Self {
        Self {
            has_conflicts: false,
            conflict_points: Vec::new(),
            conflict_percentage: 0.0,
            total_length_m: 0.0,
            conflict_length_m: 0.0,
            total_points,
        }
    }
}

// ========== WAYPOINT NETWORK ==========

/// How a waypoint candidate was generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaypointOrigin {
    /// Ring around a single blockage
    Ring {
        blockage_index: usize,
        ring_multiplier: f64,
        angle_deg: f64,
    },
    /// Bypass point around the centroid of all blockages
    Cluster { reach_multiplier: f64, angle_deg: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointCandidate {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    pub origin: WaypointOrigin,
}

impl WaypointCandidate {
    pub fn point(&self) -> PathPoint {
        PathPoint::new(self.lat, self.lon)
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self.origin, WaypointOrigin::Cluster { .. })
    }
}

/// A candidate detour: at most two waypoints between start and end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathCombination {
    pub label: String,
    pub waypoints: Vec<PathPoint>,
    pub estimated_distance_km: f64,
}

// ========== ROUTES ==========

/// A road-following path returned by a route source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedPath {
    pub points: Vec<PathPoint>,
    pub distance_km: f64,
    pub duration_min: f64,
    pub service_name: String,
}

/// Which branch of the avoidance search produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteOutcome {
    /// No blockages configured
    Direct,
    /// Caller asked to ignore blockages
    DirectObstaclesIgnored,
    /// Direct route checked and clear
    VerifiedSafe,
    /// One of the routing service's own alternatives
    NaturalAlternative,
    /// Waypoint detour with no remaining conflicts
    PerfectAvoidance,
    /// Waypoint detour with less than half the direct conflicts
    ImprovedAvoidance,
    /// Waypoint detour with some improvement
    PartialAvoidance,
    /// Nothing better found; direct route returned with a warning
    DangerousFallback,
}

impl RouteOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RouteOutcome::Direct => "Direct Route",
            RouteOutcome::DirectObstaclesIgnored => "Direct Route - Obstacles Ignored",
            RouteOutcome::VerifiedSafe => "Direct Route - Verified Safe",
            RouteOutcome::NaturalAlternative => "Natural Alternative",
            RouteOutcome::PerfectAvoidance => "Perfect Avoidance Route",
            RouteOutcome::ImprovedAvoidance => "Improved Avoidance Route",
            RouteOutcome::PartialAvoidance => "Partial Avoidance Route",
            RouteOutcome::DangerousFallback => "DANGEROUS ROUTE - OBSTACLES NOT AVOIDED",
        }
    }
}

/// Final answer of one planning call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub points: Vec<PathPoint>,
    pub distance_km: f64,
    pub duration_min: f64,
    pub service_name: String,
    pub conflicts: ConflictReport,
    pub efficiency_score: f64,
    pub strategy_label: String,
    pub waypoints_used: Vec<PathPoint>,
    pub outcome: RouteOutcome,
    pub avoidance_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub direct_distance_km: f64,
    /// Extra distance relative to the direct route, in percent
    pub distance_impact_pct: f64,
    pub candidates_tested: usize,
    pub conflict_free_candidates: usize,
}
