//! Chrono Trickster — scenario content.
//!
//! A scenario is the static data one game session is played against: the
//! three keyword vocabularies, the cast, the opening transcript, fixed
//! notices and ending reasons, and the prompt templates handed to the
//! text-generation collaborators.

pub mod application;
pub mod domain;

pub use domain::scenario::{
    Cast, Endings, Notices, OpeningLines, PromptTemplates, Scenario, Vocabulary,
};
