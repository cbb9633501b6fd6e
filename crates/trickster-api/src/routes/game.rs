//! Routes for the game session.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use trickster_session::domain::commands::{
    RerollPalette, RequestDraft, SubmitUtterance, ToggleKeyword,
};
use trickster_session::{
    DraftResult, RerollResult, SelectionResult, SessionView, TurnResult, session_view,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /turns.
#[derive(Debug, Deserialize)]
pub struct SubmitTurnRequest {
    /// What the player says.
    pub text: String,
}

/// Request body for POST /keywords/toggle.
#[derive(Debug, Deserialize)]
pub struct ToggleKeywordRequest {
    /// Palette keyword to select or deselect.
    pub token: String,
}

/// Response body for POST /turns.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    /// What the turn did.
    pub turn: TurnResult,
    /// Session state after the turn.
    pub session: SessionView,
}

/// Response body for POST /keywords/toggle.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// What the toggle did.
    pub selection: SelectionResult,
    /// Session state after the toggle.
    pub session: SessionView,
}

/// Response body for POST /keywords/reroll.
#[derive(Debug, Serialize)]
pub struct RerollResponse {
    /// What the reroll did.
    pub reroll: RerollResult,
    /// Session state after the reroll.
    pub session: SessionView,
}

/// Response body for POST /draft.
#[derive(Debug, Serialize)]
pub struct DraftResponse {
    /// What the draft request did.
    pub draft: DraftResult,
    /// Session state after the draft.
    pub session: SessionView,
}

/// GET /
#[instrument(skip(state))]
async fn get_session(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    let session = state.session()?;
    Ok(Json(session_view(&session)?))
}

/// POST /turns
#[instrument(skip(state, request))]
async fn submit_turn(
    State(state): State<AppState>,
    Json(request): Json<SubmitTurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let command = SubmitUtterance {
        correlation_id: Uuid::new_v4(),
        text: request.text,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_utterance command");

    let session = state.session()?;
    let turn = session.submit(&command).await?;

    Ok(Json(TurnResponse {
        turn,
        session: session_view(&session)?,
    }))
}

/// POST /keywords/toggle
#[instrument(skip(state, request), fields(token = %request.token))]
async fn toggle_keyword(
    State(state): State<AppState>,
    Json(request): Json<ToggleKeywordRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let command = ToggleKeyword {
        correlation_id: Uuid::new_v4(),
        token: request.token,
    };

    info!(correlation_id = %command.correlation_id, "handling toggle_keyword command");

    let session = state.session()?;
    let selection = session.toggle(&command)?;

    Ok(Json(ToggleResponse {
        selection,
        session: session_view(&session)?,
    }))
}

/// POST /keywords/reroll
#[instrument(skip(state))]
async fn reroll_palette(State(state): State<AppState>) -> Result<Json<RerollResponse>, ApiError> {
    let command = RerollPalette {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling reroll_palette command");

    let session = state.session()?;
    let reroll = session.reroll(&command)?;

    Ok(Json(RerollResponse {
        reroll,
        session: session_view(&session)?,
    }))
}

/// POST /draft
#[instrument(skip(state))]
async fn request_draft(State(state): State<AppState>) -> Result<Json<DraftResponse>, ApiError> {
    let command = RequestDraft {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling request_draft command");

    let session = state.session()?;
    let draft = session.draft(&command).await?;

    Ok(Json(DraftResponse {
        draft,
        session: session_view(&session)?,
    }))
}

/// POST /reset
#[instrument(skip(state))]
async fn reset_session(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    info!("handling reset");

    let session = state.reset()?;
    Ok(Json(session_view(&session)?))
}

/// Returns the router for the game session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_session))
        .route("/turns", post(submit_turn))
        .route("/keywords/toggle", post(toggle_keyword))
        .route("/keywords/reroll", post(reroll_palette))
        .route("/draft", post(request_draft))
        .route("/reset", post(reset_session))
}
