//! External text-generation collaborators.
//!
//! The game treats these as black boxes. Production implementations talk to
//! a language model over HTTP; tests inject scripted doubles.

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::judgment::Judgment;

/// Context handed to the judge for one player turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeRequest {
    /// The player's utterance, trimmed.
    pub utterance: String,
    /// Keywords selected when the turn was submitted (0–3).
    pub selected_keywords: Vec<String>,
    /// Suspicion before the turn is scored.
    pub suspicion: u8,
}

/// Context handed to the narrator after a non-terminal judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarratorRequest {
    /// The judgment for this turn.
    pub judgment: Judgment,
    /// The player's utterance, trimmed.
    pub utterance: String,
}

/// Scores a player turn.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Produce a judgment for the given turn.
    async fn judge(&self, request: &JudgeRequest) -> Result<Judgment, CollaboratorError>;
}

/// Voices the NPC's reply.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Produce a short in-character reply.
    async fn narrate(&self, request: &NarratorRequest) -> Result<String, CollaboratorError>;
}

/// Suggests a line of dialogue for the player. Advisory only.
#[async_trait]
pub trait DraftAssist: Send + Sync {
    /// Produce a line threading together the given keywords (1–3).
    async fn draft(&self, keywords: &[String]) -> Result<String, CollaboratorError>;
}
