//! Chrono Trickster — the game session.
//!
//! Responsible for turning a raw player utterance into a validated game
//! state transition: keyword palettes, think-time countdown, score
//! reconciliation, and the turn state machine that drives the judge and
//! narrator collaborators.

pub mod application;
pub mod domain;

pub use application::game::{Collaborators, DraftResult, GameSession, RerollResult, TurnResult};
pub use application::query_handlers::{SessionView, session_view};
pub use domain::keywords::SelectionResult;
pub use domain::state::{MAX_TIME, Outcome, Phase, Rejection};
