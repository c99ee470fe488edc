use anyhow::Result;
use clap::Parser;
use detour_cli::{parse_blockage, parse_endpoint, DetourClient};
use detour_core::CreateBlockageRequest;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a road route around blockages", long_about = None)]
struct Args {
    /// Detour server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Start as "lat,lon" or a place name
    #[arg(long)]
    from: String,

    /// Destination as "lat,lon" or a place name
    #[arg(long)]
    to: String,

    /// Blockage as "lat,lon,radius_m[,description]" (repeatable)
    #[arg(long = "blockage", value_parser = parse_blockage)]
    blockages: Vec<CreateBlockageRequest>,

    /// Return the direct route without avoidance
    #[arg(long)]
    ignore_obstacles: bool,

    /// Clear existing blockages before adding new ones
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let start = parse_endpoint(&args.from)?;
    let end = parse_endpoint(&args.to)?;
    let client = DetourClient::new(args.url);

    if args.clear {
        let removed = client.clear_blockages().await?;
        println!("Cleared {} blockages", removed);
    }

    for blockage in &args.blockages {
        let id = client.add_blockage(blockage).await?;
        println!(
            "Added blockage {} at {:.5}, {:.5} ({:.0}m)",
            id, blockage.lat, blockage.lon, blockage.radius_m
        );
    }

    println!("Requesting route...");
    let summary = client.plan(&start, &end, args.ignore_obstacles).await?;
    let route = &summary.route;

    println!("{} -> {}", summary.start.name, summary.end.name);
    println!("Strategy: {} ({})", route.strategy_label, route.outcome.label());
    println!(
        "Distance: {:.2}km (direct {:.2}km, {:+.1}%), Duration: {:.0}min via {}",
        route.distance_km,
        route.direct_distance_km,
        route.distance_impact_pct,
        route.duration_min,
        route.service_name
    );
    println!(
        "Efficiency: {:.1}%, Points: {}, Waypoints: {}",
        route.efficiency_score,
        route.points.len(),
        route.waypoints_used.len()
    );
    if route.candidates_tested > 0 {
        println!(
            "Search: {} candidates tested, {} conflict-free",
            route.candidates_tested, route.conflict_free_candidates
        );
    }
    if route.conflicts.has_conflicts {
        println!(
            "Conflicts: {} blockage hits, {:.1}% of route",
            route.conflicts.conflict_points.len(),
            route.conflicts.conflict_percentage
        );
    } else {
        println!("Conflicts: none");
    }
    if let Some(warning) = &route.warning {
        eprintln!("WARNING: {}", warning);
    }

    Ok(())
}
