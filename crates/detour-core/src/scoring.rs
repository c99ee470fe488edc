//! Scalar scoring of candidate routes.

use crate::models::ConflictReport;
use serde::{Deserialize, Serialize};

const CONFLICT_PENALTY_PER_PCT: f64 = 20.0;
const CONFLICT_FREE_BONUS: f64 = 100.0;
const LONG_DETOUR_RATIO: f64 = 2.5;
const LONG_DETOUR_PENALTY: f64 = 40.0;
const SHORT_DETOUR_RATIO: f64 = 1.5;
const SHORT_DETOUR_BONUS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteScore {
    /// Comparable score, higher is better
    pub score: f64,
    /// Straight-line over actual distance, capped at 100
    pub efficiency: f64,
}

impl RouteScore {
    /// Strict comparison: an equal score never replaces the incumbent.
    pub fn beats(&self, incumbent: Option<&RouteScore>) -> bool {
        match incumbent {
            Some(best) => self.score > best.score,
            None => true,
        }
    }
}

/// Score a route of `actual_km` against the straight-line `direct_km`.
pub fn score_route(actual_km: f64, conflicts: &ConflictReport, direct_km: f64) -> RouteScore {
    let efficiency = if actual_km > 0.0 {
        (direct_km / actual_km * 100.0).min(100.0)
    } else {
        0.0
    };

    let mut score = efficiency;
    if conflicts.has_conflicts {
        score = (score - conflicts.conflict_percentage * CONFLICT_PENALTY_PER_PCT).max(0.0);
    } else {
        score += CONFLICT_FREE_BONUS;
    }

    let detour_ratio = if direct_km > 0.0 {
        actual_km / direct_km
    } else {
        f64::INFINITY
    };
    if detour_ratio > LONG_DETOUR_RATIO {
        score -= (detour_ratio - LONG_DETOUR_RATIO) * LONG_DETOUR_PENALTY;
    } else if detour_ratio < SHORT_DETOUR_RATIO {
        score += SHORT_DETOUR_BONUS;
    }

    RouteScore { score, efficiency }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflicted(pct: f64) -> ConflictReport {
        ConflictReport {
            has_conflicts: true,
            conflict_points: Vec::new(),
            conflict_percentage: pct,
            total_length_m: 1000.0,
            conflict_length_m: pct * 10.0,
            total_points: 2,
        }
    }

    #[test]
    fn efficient_clear_route_gets_both_bonuses() {
        let s = score_route(5.0, &ConflictReport::clear(2), 5.0);
        assert_eq!(s.efficiency, 100.0);
        assert_eq!(s.score, 220.0);
    }

    #[test]
    fn conflicts_are_penalized_and_floored() {
        let s = score_route(6.0, &conflicted(10.0), 5.0);
        // 83.3 - 200 floors at 0, then the short-detour bonus applies.
        assert_eq!(s.score, 20.0);
        assert!((s.efficiency - 83.333).abs() < 0.01);
    }

    #[test]
    fn long_detours_are_penalized() {
        let s = score_route(15.0, &ConflictReport::clear(2), 5.0);
        // ratio 3.0 => -20
        assert!((s.score - (100.0 / 3.0 + 100.0 - 20.0)).abs() < 1e-9);
    }

    #[test]
    fn mid_range_detour_has_no_adjustment() {
        let s = score_route(10.0, &ConflictReport::clear(2), 5.0);
        assert_eq!(s.score, 150.0);
    }

    #[test]
    fn zero_distance_route_has_zero_efficiency() {
        let s = score_route(0.0, &ConflictReport::clear(2), 5.0);
        assert_eq!(s.efficiency, 0.0);
    }

    #[test]
    fn conflict_free_always_outscores_conflicted_at_same_distance() {
        for distance in [5.0, 7.5, 12.0, 20.0, 40.0] {
            let clear = score_route(distance, &ConflictReport::clear(2), 5.0);
            for pct in [0.01, 1.0, 25.0, 100.0] {
                let dirty = score_route(distance, &conflicted(pct), 5.0);
                assert!(clear.score > dirty.score, "distance {distance} pct {pct}");
            }
        }
    }

    #[test]
    fn ties_do_not_replace_incumbent() {
        let a = RouteScore { score: 120.0, efficiency: 80.0 };
        let b = RouteScore { score: 120.0, efficiency: 90.0 };
        assert!(a.beats(None));
        assert!(!b.beats(Some(&a)));
        let c = RouteScore { score: 120.5, efficiency: 10.0 };
        assert!(c.beats(Some(&a)));
    }
}
