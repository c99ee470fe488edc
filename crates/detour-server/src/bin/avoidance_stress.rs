use detour_core::{Blockage, ConflictDetector, PathPoint};
use detour_server::config::Config;
use detour_server::route_planner::PlanOptions;
use detour_server::state::AppState;
use std::time::Instant;

struct StressScenario {
    name: &'static str,
    start: PathPoint,
    end: PathPoint,
    blockages: Vec<(f64, f64, f64)>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    let state = AppState::new(config)?;
    let detector = ConflictDetector::from_rules(state.planner().rules());

    let scenarios = vec![
        StressScenario {
            name: "Bandra -> Kurla, no blockages",
            start: PathPoint::new(19.0596, 72.8295),
            end: PathPoint::new(19.0728, 72.8826),
            blockages: Vec::new(),
        },
        StressScenario {
            name: "Andheri -> Powai, blockage far away",
            start: PathPoint::new(19.1136, 72.8697),
            end: PathPoint::new(19.1176, 72.9060),
            blockages: vec![(19.30, 72.60, 1000.0)],
        },
        StressScenario {
            name: "Single blockage on the direct line",
            start: PathPoint::new(19.10, 72.85),
            end: PathPoint::new(19.12, 72.90),
            blockages: vec![(19.11, 72.875, 1000.0)],
        },
        StressScenario {
            name: "Two large blockages in series",
            start: PathPoint::new(19.0, 72.8),
            end: PathPoint::new(19.0, 73.2),
            blockages: vec![(19.0, 72.9, 2000.0), (19.0, 73.1, 2000.0)],
        },
    ];

    for scenario in scenarios {
        println!("\n=== {} ===", scenario.name);
        let blockages: Vec<Blockage> = scenario
            .blockages
            .iter()
            .map(|&(lat, lon, radius)| Blockage::new(lat, lon, radius, "stress"))
            .collect::<Result<_, _>>()?;

        let started = Instant::now();
        let result = state
            .planner()
            .plan(
                scenario.start,
                scenario.end,
                blockages.clone().into(),
                &PlanOptions::default(),
                state.shutdown_token(),
            )
            .await;
        let elapsed = started.elapsed();

        let result = match result {
            Ok(result) => result,
            Err(err) => {
                println!("Result: FAIL ({})", err);
                continue;
            }
        };

        println!(
            "Result: {} | {} | {:.1}km {:.0}min via {} in {:.2}s",
            result.strategy_label,
            result.outcome.label(),
            result.distance_km,
            result.duration_min,
            result.service_name,
            elapsed.as_secs_f64()
        );
        println!(
            "Search: tested={} conflict_free={} efficiency={:.1}% impact={:+.1}%",
            result.candidates_tested,
            result.conflict_free_candidates,
            result.efficiency_score,
            result.distance_impact_pct
        );
        if let Some(warning) = &result.warning {
            println!("Warning: {}", warning);
        }

        let recheck = detector.detect(&result.points, &blockages);
        if recheck.has_conflicts {
            println!(
                "Blockage check: FAIL ({:.1}% of route, {} segments)",
                recheck.conflict_percentage,
                recheck.conflict_points.len()
            );
        } else {
            println!("Blockage check: PASS");
        }
    }

    Ok(())
}
