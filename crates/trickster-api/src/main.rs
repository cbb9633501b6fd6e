//! Chrono Trickster API server entry point.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use trickster_api::config::Config;
use trickster_api::error::AppError;
use trickster_api::state::{AppState, SessionFactory};
use trickster_core::clock::SystemClock;
use trickster_core::rng::{DeterministicRng, StdRandom};
use trickster_oracle::{ChatClient, ChatDraftAssist, ChatJudge, ChatNarrator};
use trickster_scenario::application::loader;
use trickster_session::Collaborators;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Chrono Trickster API server");

    let config = Config::from_env()?;

    let scenario = match &config.scenario_path {
        Some(path) => loader::load_from_path(path)?,
        None => loader::builtin()?,
    };
    tracing::info!(title = %scenario.title, "scenario loaded");

    // Build the language-model collaborators.
    let client = Arc::new(ChatClient::new(config.oracle.clone())?);
    let templates = Arc::new(scenario.prompts.clone());
    let collaborators = Collaborators {
        judge: Arc::new(ChatJudge::new(Arc::clone(&client), Arc::clone(&templates))),
        narrator: Arc::new(ChatNarrator::new(Arc::clone(&client), Arc::clone(&templates))),
        draft_assist: Arc::new(ChatDraftAssist::new(client, templates)),
    };

    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = match config.seed {
        Some(seed) => {
            tracing::info!(seed, "keyword sampler seeded");
            Arc::new(Mutex::new(StdRandom::seeded(seed)))
        }
        None => Arc::new(Mutex::new(StdRandom::from_entropy())),
    };

    // Build application state.
    let app_state = AppState::new(SessionFactory {
        scenario: Arc::new(scenario),
        collaborators,
        clock: Arc::new(SystemClock),
        rng,
    })?;

    // Build router.
    // TODO: Replace CorsLayer::permissive() with the front-end origin once it is hosted.
    let app = trickster_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
