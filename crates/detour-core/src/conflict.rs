//! Conflict detection between a route and a set of blockages.
//!
//! Each segment is checked at a handful of evenly spaced samples rather than
//! by exact circle/segment intersection. Very short incursions on long
//! segments can be missed; the sample count bounds the cost per segment.

use crate::models::{Blockage, ConflictPoint, ConflictReport, PathPoint};
use crate::rules::AvoidanceRules;
use crate::spatial::{distance_m, interpolate};

/// Stateless route/blockage conflict checker.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    /// Margin added to each blockage radius (meters)
    pub buffer_m: f64,
    /// Samples per segment, endpoints included
    pub samples_per_segment: usize,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::from_rules(&AvoidanceRules::default())
    }
}

impl ConflictDetector {
    pub fn new(buffer_m: f64, samples_per_segment: usize) -> Self {
        Self {
            buffer_m,
            samples_per_segment: samples_per_segment.max(2),
        }
    }

    pub fn from_rules(rules: &AvoidanceRules) -> Self {
        Self::new(rules.conflict_buffer_m, rules.samples_per_segment)
    }

    /// Check a path against every blockage.
    ///
    /// A segment counts once: the first sample found inside any blockage's
    /// `radius + buffer` is recorded and the rest of the segment is skipped.
    pub fn detect(&self, path: &[PathPoint], blockages: &[Blockage]) -> ConflictReport {
        if path.is_empty() || blockages.is_empty() {
            return ConflictReport::clear(path.len());
        }

        let mut conflict_points = Vec::new();
        let mut total_length_m = 0.0;
        let mut conflict_length_m = 0.0;
        let last_sample = (self.samples_per_segment - 1) as f64;

        for (segment_index, pair) in path.windows(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            let segment_length = distance_m(a, b);
            total_length_m += segment_length;

            if let Some(hit) = self.first_hit(a, b, last_sample, blockages) {
                let (point, blockage, distance_to_center_m) = hit;
                conflict_points.push(ConflictPoint {
                    segment_index,
                    point,
                    blockage: blockage.clone(),
                    distance_to_center_m,
                });
                conflict_length_m += segment_length;
            }
        }

        let conflict_percentage = if total_length_m > 0.0 {
            (conflict_length_m / total_length_m * 100.0).min(100.0)
        } else {
            0.0
        };

        ConflictReport {
            has_conflicts: !conflict_points.is_empty(),
            conflict_points,
            conflict_percentage,
            total_length_m,
            conflict_length_m,
            total_points: path.len(),
        }
    }

    fn first_hit<'a>(
        &self,
        a: PathPoint,
        b: PathPoint,
        last_sample: f64,
        blockages: &'a [Blockage],
    ) -> Option<(PathPoint, &'a Blockage, f64)> {
        for step in 0..self.samples_per_segment {
            let sample = interpolate(a, b, step as f64 / last_sample);
            for blockage in blockages {
                let dist = distance_m(sample, blockage.center());
                if dist <= blockage.radius_m + self.buffer_m {
                    return Some((sample, blockage, dist));
                }
            }
        }
        None
    }
}
