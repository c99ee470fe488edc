//! Blockage-aware route planning.
//!
//! Direct route first; if it crosses a blockage, the routing service's own
//! alternatives; then an exhaustive search over single- and dual-waypoint
//! detours. The planner always answers with a route unless the direct route
//! itself cannot be produced.

use detour_core::{
    distance_km, score_route, AvoidanceRules, AvoidanceStage, Blockage, ConflictDetector,
    ConflictReport, NoopObserver, PathCombination, PathExplorer, PathPoint, ProgressObserver,
    ProviderError, RouteOutcome, RouteResult, RouteScore, RouteSource, RoutedPath,
    WaypointNetworkBuilder,
};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_AVOIDANCE_WORKERS: usize = 4;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Could not calculate direct route: {0}")]
    DirectRouteUnavailable(ProviderError),
}

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Return the direct route without checking blockages
    pub ignore_obstacles: bool,
    /// Stop the detour search after this long and keep the best so far
    pub deadline: Option<Duration>,
}

/// Progress observer that forwards stage changes to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_progress(&self, stage: AvoidanceStage, detail: &str) {
        match stage {
            AvoidanceStage::Evaluate => debug!(stage = %stage, "{}", detail),
            AvoidanceStage::Fallback => warn!(stage = %stage, "{}", detail),
            _ => info!(stage = %stage, "{}", detail),
        }
    }
}

/// One routed, checked and scored detour.
#[derive(Debug, Clone)]
struct Evaluated {
    combination: PathCombination,
    path: RoutedPath,
    conflicts: ConflictReport,
    score: RouteScore,
}

#[derive(Debug, Default)]
struct SearchStats {
    tested: usize,
    conflict_free: usize,
}

pub struct AvoidancePlanner<S> {
    source: S,
    rules: AvoidanceRules,
    workers: usize,
    observer: Arc<dyn ProgressObserver>,
}

impl<S: RouteSource> AvoidancePlanner<S> {
    pub fn new(source: S, rules: AvoidanceRules) -> Self {
        Self {
            source,
            rules,
            workers: DEFAULT_AVOIDANCE_WORKERS,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn rules(&self) -> &AvoidanceRules {
        &self.rules
    }

    /// Best direct route, ignoring blockages.
    pub async fn direct_route(&self, start: PathPoint, end: PathPoint) -> Result<RoutedPath, PlanError> {
        let mut routes = self.direct_routes(start, end).await?;
        Ok(routes.swap_remove(0))
    }

    /// Direct route plus any alternatives the source offered, in service order.
    async fn direct_routes(&self, start: PathPoint, end: PathPoint) -> Result<Vec<RoutedPath>, PlanError> {
        let routes = self
            .source
            .get_route(start, end, &[])
            .await
            .map_err(PlanError::DirectRouteUnavailable)?
            .into_paths();
        if routes.is_empty() {
            return Err(PlanError::DirectRouteUnavailable(ProviderError::InvalidResponse(
                "no routes returned".to_string(),
            )));
        }
        Ok(routes)
    }

    /// Plan a route from `start` to `end` around `blockages`.
    ///
    /// `blockages` is a snapshot; the caller may keep mutating its own list.
    /// Cancelling `cancel` (or hitting the deadline) ends the detour search
    /// early with the best candidate found so far.
    pub async fn plan(
        &self,
        start: PathPoint,
        end: PathPoint,
        blockages: Arc<[Blockage]>,
        options: &PlanOptions,
        cancel: &CancellationToken,
    ) -> Result<RouteResult, PlanError> {
        let straight_km = distance_km(start, end);

        self.observer
            .on_progress(AvoidanceStage::DirectRoute, "Requesting direct route");
        let mut routes = self.direct_routes(start, end).await?;
        let direct = routes[0].clone();

        if options.ignore_obstacles || blockages.is_empty() {
            let outcome = if options.ignore_obstacles {
                RouteOutcome::DirectObstaclesIgnored
            } else {
                RouteOutcome::Direct
            };
            let conflicts = ConflictReport::clear(direct.points.len());
            return Ok(self.finish(direct, conflicts, outcome, 100.0, straight_km));
        }

        let detector = ConflictDetector::from_rules(&self.rules);
        self.observer.on_progress(
            AvoidanceStage::ConflictCheck,
            &format!("Checking direct route against {} blockages", blockages.len()),
        );
        let direct_conflicts = detector.detect(&direct.points, &blockages);
        if !direct_conflicts.has_conflicts {
            return Ok(self.finish(
                direct,
                direct_conflicts,
                RouteOutcome::VerifiedSafe,
                100.0,
                straight_km,
            ));
        }
        info!(
            "Direct route conflicts with blockages on {:.1}% of its length",
            direct_conflicts.conflict_percentage
        );

        if routes.len() > 1 {
            if let Some(result) =
                self.natural_alternative(&mut routes, &detector, &blockages, straight_km)
            {
                return Ok(result);
            }
        }

        let (best, stats) = self
            .search(start, end, Arc::clone(&blockages), options, cancel)
            .await;

        let Some(best) = best else {
            let warning = format!(
                "CRITICAL: Route passes through {} obstacle areas",
                direct_conflicts.conflict_points.len()
            );
            self.observer.on_progress(AvoidanceStage::Fallback, &warning);
            let mut result = self.finish(
                direct,
                direct_conflicts,
                RouteOutcome::DangerousFallback,
                0.0,
                straight_km,
            );
            result.warning = Some(warning);
            result.candidates_tested = stats.tested;
            return Ok(result);
        };

        let outcome = if !best.conflicts.has_conflicts {
            RouteOutcome::PerfectAvoidance
        } else if best.conflicts.conflict_percentage < direct_conflicts.conflict_percentage / 2.0 {
            RouteOutcome::ImprovedAvoidance
        } else {
            RouteOutcome::PartialAvoidance
        };
        self.observer.on_progress(
            AvoidanceStage::Complete,
            &format!(
                "{}: {} (score {:.1}, tested {}, conflict-free {})",
                outcome.label(),
                best.combination.label,
                best.score.score,
                stats.tested,
                stats.conflict_free
            ),
        );

        let mut result = self.finish(
            best.path,
            best.conflicts,
            outcome,
            best.score.efficiency,
            straight_km,
        );
        result.strategy_label = best.combination.label;
        result.waypoints_used = best.combination.waypoints;
        result.candidates_tested = stats.tested;
        result.conflict_free_candidates = stats.conflict_free;
        Ok(result)
    }

    /// Score every alternative; accept the best if it clears the threshold.
    fn natural_alternative(
        &self,
        routes: &mut Vec<RoutedPath>,
        detector: &ConflictDetector,
        blockages: &[Blockage],
        straight_km: f64,
    ) -> Option<RouteResult> {
        self.observer.on_progress(
            AvoidanceStage::NaturalAlternatives,
            &format!("Scoring {} service alternatives", routes.len()),
        );

        let mut best: Option<(usize, ConflictReport, RouteScore)> = None;
        for (index, path) in routes.iter().enumerate() {
            let conflicts = detector.detect(&path.points, blockages);
            let score = score_route(path.distance_km, &conflicts, straight_km);
            debug!(
                "Alternative {}: {:.1}km, conflicts {:.1}%, score {:.1}",
                index + 1,
                path.distance_km,
                conflicts.conflict_percentage,
                score.score
            );
            if score.beats(best.as_ref().map(|(_, _, s)| s)) {
                best = Some((index, conflicts, score));
            }
        }

        let (index, conflicts, score) = best?;
        if score.score <= self.rules.natural_alternative_threshold {
            debug!(
                "Best alternative scored {:.1}, below threshold {:.1}",
                score.score, self.rules.natural_alternative_threshold
            );
            return None;
        }

        let path = routes.swap_remove(index);
        let mut result = self.finish(
            path,
            conflicts,
            RouteOutcome::NaturalAlternative,
            score.efficiency,
            straight_km,
        );
        result.strategy_label = format!("Natural Alternative {}", index + 1);
        Some(result)
    }

    /// Route, check and score every combination; keep the first best.
    async fn search(
        &self,
        start: PathPoint,
        end: PathPoint,
        blockages: Arc<[Blockage]>,
        options: &PlanOptions,
        cancel: &CancellationToken,
    ) -> (Option<Evaluated>, SearchStats) {
        let network = WaypointNetworkBuilder::new(self.rules.clone()).build(&blockages);
        self.observer.on_progress(
            AvoidanceStage::NetworkBuild,
            &format!("Generated {} waypoint candidates", network.len()),
        );
        let combinations =
            PathExplorer::new(self.rules.clone()).explore(start, end, &network, &blockages);
        self.observer.on_progress(
            AvoidanceStage::Explore,
            &format!("Testing {} path combinations", combinations.len()),
        );

        let detector = ConflictDetector::from_rules(&self.rules);
        let straight_km = distance_km(start, end);

        // buffered() yields in input order, so the reduction below sees
        // candidates exactly as the explorer ranked them.
        let mut evaluations = futures::stream::iter(combinations)
            .map(|combination| {
                self.evaluate(
                    start,
                    end,
                    combination,
                    detector,
                    Arc::clone(&blockages),
                    straight_km,
                )
            })
            .buffered(self.workers);

        let deadline = until_deadline(options.deadline);
        tokio::pin!(deadline);

        let mut best: Option<Evaluated> = None;
        let mut stats = SearchStats::default();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Detour search cancelled after {} candidates", stats.tested);
                    break;
                }
                _ = &mut deadline => {
                    warn!("Detour search deadline reached after {} candidates", stats.tested);
                    break;
                }
                next = evaluations.next() => next,
            };
            let Some(evaluation) = next else {
                break;
            };

            stats.tested += 1;
            let Some(candidate) = evaluation else {
                continue;
            };
            if !candidate.conflicts.has_conflicts {
                stats.conflict_free += 1;
            }
            if candidate.score.beats(best.as_ref().map(|b| &b.score)) {
                debug!(
                    "New best: {} (score {:.1})",
                    candidate.combination.label, candidate.score.score
                );
                best = Some(candidate);
            }
        }

        (best, stats)
    }

    async fn evaluate(
        &self,
        start: PathPoint,
        end: PathPoint,
        combination: PathCombination,
        detector: ConflictDetector,
        blockages: Arc<[Blockage]>,
        straight_km: f64,
    ) -> Option<Evaluated> {
        let response = match self
            .source
            .get_route(start, end, &combination.waypoints)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!("Path failed: {} - {}", combination.label, err);
                return None;
            }
        };
        let path = response.into_primary()?;
        let conflicts = detector.detect(&path.points, &blockages);
        let score = score_route(path.distance_km, &conflicts, straight_km);

        self.observer.on_progress(
            AvoidanceStage::Evaluate,
            &format!(
                "{}: {:.1}km, conflicts {:.1}%, score {:.1}",
                combination.label, path.distance_km, conflicts.conflict_percentage, score.score
            ),
        );

        Some(Evaluated {
            combination,
            path,
            conflicts,
            score,
        })
    }

    fn finish(
        &self,
        path: RoutedPath,
        conflicts: ConflictReport,
        outcome: RouteOutcome,
        efficiency_score: f64,
        straight_km: f64,
    ) -> RouteResult {
        let distance_impact_pct = if straight_km > 0.0 {
            (path.distance_km - straight_km) / straight_km * 100.0
        } else {
            0.0
        };
        info!(
            "Route ready: {} via {} ({:.1}km)",
            outcome.label(),
            path.service_name,
            path.distance_km
        );
        RouteResult {
            points: path.points,
            distance_km: path.distance_km,
            duration_min: path.duration_min,
            service_name: path.service_name,
            avoidance_success: !conflicts.has_conflicts,
            conflicts,
            efficiency_score,
            strategy_label: outcome.label().to_string(),
            waypoints_used: Vec::new(),
            outcome,
            warning: None,
            direct_distance_km: straight_km,
            distance_impact_pct,
            candidates_tested: 0,
            conflict_free_candidates: 0,
        }
    }
}

fn until_deadline(deadline: Option<Duration>) -> impl Future<Output = ()> {
    async move {
        match deadline {
            Some(after) => tokio::time::sleep(after).await,
            None => std::future::pending().await,
        }
    }
}
