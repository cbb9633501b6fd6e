//! Chrono Trickster — language-model collaborators.
//!
//! Implements the judge, narrator and draft assistant against any
//! OpenAI-compatible chat-completions endpoint.

pub mod application;
pub mod domain;

pub use application::client::{ChatClient, OracleConfig};
pub use application::collaborators::{ChatDraftAssist, ChatJudge, ChatNarrator};
