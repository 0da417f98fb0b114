//! Serve command - runs the gateway server

use std::net::SocketAddr;

use axum::routing::any;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::MessageBody;
use crate::api::create_router_with_downstream;
use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Run the gateway server until interrupted
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let (state, audit_sink) = crate::create_app_state(&config).await?;
    let downstream = placeholder_downstream(&config.admission.protected_resources);
    let app = create_router_with_downstream(state, downstream);

    let addr = build_socket_addr(&config)?;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain queued audit events before exiting
    audit_sink.shutdown().await;

    Ok(())
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

/// Stand-alone deployments get a trivial handler behind each protected
/// path so the gateway is runnable without a real downstream service.
/// Real deployments pass their own router to
/// `create_router_with_downstream` instead.
fn placeholder_downstream(protected_resources: &[String]) -> Router<AppState> {
    let mut router = Router::new();

    for path in protected_resources {
        router = router.route(path, any(|| async { Json(MessageBody::new("OK")) }));
    }

    router
}
