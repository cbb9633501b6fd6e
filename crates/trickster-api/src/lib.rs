//! Chrono Trickster — HTTP API.
//!
//! Serves one in-memory game session over JSON.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/game", routes::game::router())
        .with_state(app_state)
}
