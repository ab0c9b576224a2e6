//! Guess Commit Server
//!
//! HTTP service hosting guessing games with encrypted commitments.

use guess_commit_server::{create_router, spawn_expiry_sweeper, AppState, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        range = %config.range,
        guess_budget = config.guess_budget,
        ttl_secs = config.session_ttl.as_secs(),
        "configuration loaded"
    );

    let state = AppState::new(config.clone());

    if spawn_expiry_sweeper(state.registry_handle(), config.session_ttl).is_none() {
        info!("session expiry disabled (set SESSION_TTL_SECS to enable)");
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Guess commit service listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
