//! Tunable thresholds for the detour search.

use serde::{Deserialize, Serialize};

/// Configuration for conflict checks, waypoint generation and scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvoidanceRules {
    /// Margin added to a blockage radius when checking route samples (meters)
    pub conflict_buffer_m: f64,
    /// Number of evenly spaced samples per path segment
    pub samples_per_segment: usize,
    /// Clearance required for per-blockage ring waypoints (meters)
    pub ring_buffer_m: f64,
    /// Clearance required for cluster bypass waypoints (meters)
    pub cluster_buffer_m: f64,
    /// Ring distances as multiples of the blockage radius
    pub ring_multipliers: Vec<f64>,
    /// Minimum ring distance (meters)
    pub min_ring_distance_m: f64,
    /// Number of compass directions per ring
    pub ring_directions: usize,
    /// Cluster bypass distances as multiples of the cluster reach
    pub cluster_multipliers: Vec<f64>,
    /// Number of compass directions around the cluster centroid
    pub cluster_directions: usize,
    /// Single-waypoint detours longer than direct * this are dropped
    pub max_single_detour_ratio: f64,
    /// Dual-waypoint detours longer than direct * this are dropped
    pub max_dual_detour_ratio: f64,
    /// Any blockage larger than this enables dual-waypoint detours (meters)
    pub dual_radius_trigger_m: f64,
    /// Waypoints closest to start considered for dual detours
    pub dual_candidate_pool: usize,
    /// Upper bound on combinations sent to the routing service
    pub max_combinations: usize,
    /// Minimum score for a natural alternative to be accepted
    pub natural_alternative_threshold: f64,
    /// Average speed assumed for synthetic routes (km/h)
    pub synthetic_speed_kmh: f64,
}

impl Default for AvoidanceRules {
    fn default() -> Self {
        Self {
            conflict_buffer_m: 150.0,
            samples_per_segment: 5,
            ring_buffer_m: 300.0,
            cluster_buffer_m: 500.0,
            ring_multipliers: vec![1.5, 2.0, 2.5, 3.0],
            min_ring_distance_m: 1000.0,
            ring_directions: 8,
            cluster_multipliers: vec![1.8, 2.2, 2.6],
            cluster_directions: 6,
            max_single_detour_ratio: 3.0,
            max_dual_detour_ratio: 3.5,
            dual_radius_trigger_m: 1500.0,
            dual_candidate_pool: 20,
            max_combinations: 50,
            natural_alternative_threshold: 50.0,
            synthetic_speed_kmh: 40.0,
        }
    }
}
