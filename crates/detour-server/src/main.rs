//! Detour Server - blockage-aware routing service

use anyhow::Result;
use detour_server::{api, config::Config, state::AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("detour_server=info".parse()?),
        )
        .init();

    tracing::info!("Starting Detour Server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        "Routing mirrors: {} (workers {}, buffer {:.0}m)",
        config.osrm_mirrors.join(", "),
        config.avoidance_workers,
        config.conflict_buffer_m
    );

    let state = Arc::new(AppState::new(config)?);
    let shutdown = state.shutdown_token().clone();

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", err);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown requested, finishing in-flight plans");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
