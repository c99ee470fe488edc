//! Waypoint network generation around blockages.
//!
//! Candidates are produced in insertion order: for each blockage its rings
//! (inner to outer) and bearings, then the cluster bypass points. Callers
//! that need distance ordering sort explicitly.

use crate::models::{Blockage, PathPoint, WaypointCandidate, WaypointOrigin};
use crate::rules::AvoidanceRules;
use crate::spatial::{centroid, distance_m, offset_by_bearing};

/// Builds the candidate detour points for a blockage set.
#[derive(Debug, Clone)]
pub struct WaypointNetworkBuilder {
    rules: AvoidanceRules,
}

impl Default for WaypointNetworkBuilder {
    fn default() -> Self {
        Self::new(AvoidanceRules::default())
    }
}

impl WaypointNetworkBuilder {
    pub fn new(rules: AvoidanceRules) -> Self {
        Self { rules }
    }

    pub fn build(&self, blockages: &[Blockage]) -> Vec<WaypointCandidate> {
        let mut network = Vec::new();
        for (index, blockage) in blockages.iter().enumerate() {
            self.push_rings(index, blockage, blockages, &mut network);
        }
        if blockages.len() > 1 {
            self.push_cluster(blockages, &mut network);
        }
        network
    }

    fn push_rings(
        &self,
        index: usize,
        blockage: &Blockage,
        blockages: &[Blockage],
        network: &mut Vec<WaypointCandidate>,
    ) {
        let step_deg = 360.0 / self.rules.ring_directions.max(1) as f64;
        for &ring_multiplier in &self.rules.ring_multipliers {
            let ring_m = (blockage.radius_m * ring_multiplier).max(self.rules.min_ring_distance_m);
            for direction in 0..self.rules.ring_directions {
                let angle_deg = direction as f64 * step_deg;
                let (lat, lon) =
                    offset_by_bearing(blockage.lat, blockage.lon, ring_m, angle_deg.to_radians());
                let point = PathPoint::new(lat, lon);
                if !clears_all(point, blockages, self.rules.ring_buffer_m) {
                    continue;
                }
                network.push(WaypointCandidate {
                    lat,
                    lon,
                    label: format!("WP_B{}_R{:.1}_{}deg", index + 1, ring_multiplier, angle_deg),
                    origin: WaypointOrigin::Ring {
                        blockage_index: index,
                        ring_multiplier,
                        angle_deg,
                    },
                });
            }
        }
    }

    fn push_cluster(&self, blockages: &[Blockage], network: &mut Vec<WaypointCandidate>) {
        let centers: Vec<PathPoint> = blockages.iter().map(Blockage::center).collect();
        let Some(center) = centroid(&centers) else {
            return;
        };
        let reach_m = blockages
            .iter()
            .map(|b| distance_m(center, b.center()) + b.radius_m)
            .fold(0.0_f64, f64::max);

        let step_deg = 360.0 / self.rules.cluster_directions.max(1) as f64;
        for &reach_multiplier in &self.rules.cluster_multipliers {
            let bypass_m = reach_m * reach_multiplier;
            for direction in 0..self.rules.cluster_directions {
                let angle_deg = direction as f64 * step_deg;
                let (lat, lon) =
                    offset_by_bearing(center.lat, center.lon, bypass_m, angle_deg.to_radians());
                let point = PathPoint::new(lat, lon);
                if !clears_all(point, blockages, self.rules.cluster_buffer_m) {
                    continue;
                }
                network.push(WaypointCandidate {
                    lat,
                    lon,
                    label: cluster_label(bypass_m, angle_deg),
                    origin: WaypointOrigin::Cluster {
                        reach_multiplier,
                        angle_deg,
                    },
                });
            }
        }
    }
}

/// True when `point` is farther than `radius + buffer_m` from every blockage.
fn clears_all(point: PathPoint, blockages: &[Blockage], buffer_m: f64) -> bool {
    blockages
        .iter()
        .all(|b| distance_m(point, b.center()) > b.radius_m + buffer_m)
}

/// Whole kilometers, truncated.
fn cluster_label(bypass_m: f64, angle_deg: f64) -> String {
    format!("Cluster_WP_{}km_{}deg", (bypass_m / 1000.0) as u64, angle_deg)
}
