//! Guess Commit HTTP API
//!
//! JSON front end over the session registry: create a game, commit, guess,
//! reveal, and poll stats.

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

use guess_commit_core::SessionRegistry;
use handlers::*;

pub use config::ServerConfig;
pub use state::AppState;

/// Longest pause between expiry sweeps
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/concepts", get(get_concepts))
        .route("/api/game/create", post(create_game))
        .route("/api/game/:game_id/commit", post(commit_number))
        .route("/api/game/:game_id/guess", post(make_guess))
        .route("/api/game/:game_id/reveal", post(reveal_game))
        .route("/api/game/:game_id/stats", get(get_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Periodically close and drop sessions older than `ttl`.
///
/// A zero `ttl` disables expiry and spawns nothing.
pub fn spawn_expiry_sweeper(
    registry: Arc<SessionRegistry>,
    ttl: Duration,
) -> Option<tokio::task::JoinHandle<()>> {
    if ttl.is_zero() {
        return None;
    }
    let period = ttl.min(MAX_SWEEP_INTERVAL);
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let expired = registry.expire_older_than(ttl);
            if expired > 0 {
                info!(expired, remaining = registry.len(), "expired stale sessions");
            }
        }
    }))
}
