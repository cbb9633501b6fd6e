//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use trickster_core::collaborator::Judge;
use trickster_core::judgment::Judgment;
use trickster_core::rng::DeterministicRng;
use trickster_scenario::application::loader::builtin;
use trickster_session::Collaborators;
use trickster_test_support::{
    ScriptedDraftAssist, ScriptedJudge, ScriptedNarrator, SequenceRng, fixed_clock,
};
use tower::ServiceExt;

use trickster_api::build_router;
use trickster_api::state::{AppState, SessionFactory};

/// Build application state with scripted collaborators and a deterministic
/// clock and RNG.
pub fn build_test_state(judge: Arc<dyn Judge>, replies: Vec<&str>) -> AppState {
    // Enough draws for a handful of palettes; each palette takes 23.
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SequenceRng::new(vec![0; 23 * 16])));
    AppState::new(SessionFactory {
        scenario: Arc::new(builtin().unwrap()),
        collaborators: Collaborators {
            judge,
            narrator: Arc::new(ScriptedNarrator::new(replies)),
            draft_assist: Arc::new(ScriptedDraftAssist::new("娘娘，白绫已备好")),
        },
        clock: Arc::new(fixed_clock()),
        rng,
    })
    .unwrap()
}

/// Build the full app router around scripted judgments.
pub fn build_test_app(judgments: Vec<Judgment>, replies: Vec<&str>) -> Router {
    build_router(build_test_state(Arc::new(ScriptedJudge::new(judgments)), replies))
}

/// A judgment with the given deltas.
pub fn judgment(suspicion_delta: i64, progress_delta: i64) -> Judgment {
    Judgment {
        suspicion_delta,
        progress_delta,
        reason: "判定".to_owned(),
        npc_state: "警惕".to_owned(),
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
