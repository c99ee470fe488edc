//! Enumeration of single- and dual-waypoint detour candidates.

use crate::models::{Blockage, PathCombination, PathPoint, WaypointCandidate};
use crate::rules::AvoidanceRules;
use crate::spatial::distance_km;

/// Turns a waypoint network into a bounded, distance-ordered candidate list.
#[derive(Debug, Clone)]
pub struct PathExplorer {
    rules: AvoidanceRules,
}

impl Default for PathExplorer {
    fn default() -> Self {
        Self::new(AvoidanceRules::default())
    }
}

impl PathExplorer {
    pub fn new(rules: AvoidanceRules) -> Self {
        Self { rules }
    }

    /// Enumerate candidates ordered by estimated distance, capped at
    /// `max_combinations`.
    pub fn explore(
        &self,
        start: PathPoint,
        end: PathPoint,
        network: &[WaypointCandidate],
        blockages: &[Blockage],
    ) -> Vec<PathCombination> {
        let direct_km = distance_km(start, end);
        let mut combinations = Vec::new();

        let single_limit = direct_km * self.rules.max_single_detour_ratio;
        for node in network {
            let wp = node.point();
            let estimated = distance_km(start, wp) + distance_km(wp, end);
            if estimated <= single_limit {
                combinations.push(PathCombination {
                    label: format!("Single WP: {}", node.label),
                    waypoints: vec![wp],
                    estimated_distance_km: estimated,
                });
            }
        }

        if self.wants_dual(blockages) {
            self.push_duals(start, end, direct_km, network, &mut combinations);
        }

        // sort_by is stable, so equal estimates keep generation order
        combinations.sort_by(|a, b| a.estimated_distance_km.total_cmp(&b.estimated_distance_km));
        if combinations.len() > self.rules.max_combinations {
            tracing::debug!(
                "Limiting to {} most promising combinations (out of {})",
                self.rules.max_combinations,
                combinations.len()
            );
            combinations.truncate(self.rules.max_combinations);
        }
        combinations
    }

    fn wants_dual(&self, blockages: &[Blockage]) -> bool {
        blockages.len() > 1
            || blockages
                .iter()
                .any(|b| b.radius_m > self.rules.dual_radius_trigger_m)
    }

    fn push_duals(
        &self,
        start: PathPoint,
        end: PathPoint,
        direct_km: f64,
        network: &[WaypointCandidate],
        combinations: &mut Vec<PathCombination>,
    ) {
        let mut nearest: Vec<(f64, &WaypointCandidate)> = network
            .iter()
            .map(|node| (distance_km(start, node.point()), node))
            .collect();
        nearest.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearest.truncate(self.rules.dual_candidate_pool);

        let dual_limit = direct_km * self.rules.max_dual_detour_ratio;
        for (i, (to_first, first)) in nearest.iter().enumerate() {
            for (_, second) in &nearest[i + 1..] {
                let wp1 = first.point();
                let wp2 = second.point();
                let estimated = to_first + distance_km(wp1, wp2) + distance_km(wp2, end);
                if estimated <= dual_limit {
                    combinations.push(PathCombination {
                        label: format!("Dual WP: {} -> {}", first.label, second.label),
                        waypoints: vec![wp1, wp2],
                        estimated_distance_km: estimated,
                    });
                }
            }
        }
    }
}
