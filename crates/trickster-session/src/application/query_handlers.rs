//! Query handlers for the session context.
//!
//! Snapshots the live session into a read-only view DTO.

use serde::Serialize;
use trickster_core::error::DomainError;
use trickster_core::judgment::Judgment;

use crate::application::game::GameSession;
use crate::domain::state::{Outcome, TurnEntry};

/// Read-only view of a game session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// The NPC's distrust, 0–100.
    pub suspicion: u8,
    /// Task completion, 0–100.
    pub progress: u8,
    /// `awaiting_input`, `processing` or `ended`.
    pub phase: &'static str,
    /// Set once the session has ended.
    pub outcome: Option<Outcome>,
    /// Seconds left to answer. Frozen while a turn is processing.
    pub time_remaining: u32,
    /// Keywords on offer this turn.
    pub palette: Vec<String>,
    /// Keywords currently selected, in selection order.
    pub selected_keywords: Vec<String>,
    /// Suggested input from the draft assistant.
    pub pending_input: Option<String>,
    /// Every line so far, oldest first.
    pub transcript: Vec<TurnEntry>,
    /// Every judgment so far, most recent first.
    pub analysis_log: Vec<Judgment>,
}

/// Takes a consistent snapshot of `session`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the session mutex is poisoned.
pub fn session_view(session: &GameSession) -> Result<SessionView, DomainError> {
    let state = session.state()?;
    let time_remaining = if state.is_ended() {
        0
    } else {
        session.timer().remaining_secs()
    };
    let scores = state.scores();

    Ok(SessionView {
        suspicion: scores.suspicion,
        progress: scores.progress,
        phase: state.phase().name(),
        outcome: state.outcome().cloned(),
        time_remaining,
        palette: state.palette().tokens().to_vec(),
        selected_keywords: state.selected_keywords().to_vec(),
        pending_input: state.pending_input().map(str::to_owned),
        transcript: state.transcript().to_vec(),
        analysis_log: state.analysis_log().iter().cloned().collect(),
    })
}
