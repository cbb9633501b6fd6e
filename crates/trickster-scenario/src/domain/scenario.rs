//! Scenario definition and validation.

use std::collections::HashSet;

use serde::Deserialize;
use trickster_core::error::DomainError;

/// Keyword vocabularies a palette is drawn from.
///
/// The sampler treats all three categories alike; only the judge rubric
/// gives them meaning.
#[derive(Debug, Clone, Deserialize)]
pub struct Vocabulary {
    /// Tokens that signal legitimate, progress-making speech.
    pub core: Vec<String>,
    /// Decoys with no mechanical effect.
    pub noise: Vec<String>,
    /// Decoys the judge penalises.
    pub trap: Vec<String>,
}

impl Vocabulary {
    /// Core tokens drawn into every palette.
    pub const CORE_DRAW: usize = 4;
    /// Noise tokens drawn into every palette.
    pub const NOISE_DRAW: usize = 5;
    /// Trap tokens drawn into every palette.
    pub const TRAP_DRAW: usize = 3;
    /// Total palette size.
    pub const PALETTE_SIZE: usize = Self::CORE_DRAW + Self::NOISE_DRAW + Self::TRAP_DRAW;

    /// Returns `true` if `token` belongs to the core vocabulary.
    #[must_use]
    pub fn is_core(&self, token: &str) -> bool {
        self.core.iter().any(|t| t == token)
    }

    /// Returns `true` if `token` belongs to the trap vocabulary.
    #[must_use]
    pub fn is_trap(&self, token: &str) -> bool {
        self.trap.iter().any(|t| t == token)
    }

    fn validate(&self) -> Result<(), DomainError> {
        for (name, tokens, draw) in [
            ("core", &self.core, Self::CORE_DRAW),
            ("noise", &self.noise, Self::NOISE_DRAW),
            ("trap", &self.trap, Self::TRAP_DRAW),
        ] {
            if tokens.len() < draw {
                return Err(DomainError::Validation(format!(
                    "{name} vocabulary needs at least {draw} tokens, found {}",
                    tokens.len()
                )));
            }
        }

        let mut seen = HashSet::new();
        for token in self.core.iter().chain(&self.noise).chain(&self.trap) {
            if token.trim().is_empty() {
                return Err(DomainError::Validation(
                    "vocabulary tokens must not be blank".to_owned(),
                ));
            }
            if !seen.insert(token.as_str()) {
                return Err(DomainError::Validation(format!(
                    "vocabulary token '{token}' appears more than once"
                )));
            }
        }
        Ok(())
    }
}

/// Display names of the two speaking roles.
#[derive(Debug, Clone, Deserialize)]
pub struct Cast {
    /// Name shown on player transcript entries.
    pub player: String,
    /// Name shown on NPC transcript entries.
    pub npc: String,
}

/// Transcript lines a fresh session starts with.
#[derive(Debug, Clone, Deserialize)]
pub struct OpeningLines {
    /// System banner.
    pub system: String,
    /// The NPC's first line.
    pub npc: String,
}

/// Fixed System notices appended by the engine itself.
#[derive(Debug, Clone, Deserialize)]
pub struct Notices {
    /// Posted when the think-time countdown expires.
    pub timeout: String,
    /// Posted when a collaborator call fails mid-turn.
    pub communication_fault: String,
}

/// Reasons recorded in the outcome when the session ends.
#[derive(Debug, Clone, Deserialize)]
pub struct Endings {
    /// Progress reached 100.
    pub victory: String,
    /// Suspicion reached 100 on a judged turn.
    pub defeat: String,
    /// Suspicion reached 100 through a timeout penalty.
    pub timeout_defeat: String,
}

/// Prompt templates for the collaborators, with `{placeholder}` slots.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplates {
    /// Slots: `{utterance}`, `{keywords}`, `{suspicion}`.
    pub judge: String,
    /// Slots: `{reason}`, `{npc_state}`, `{utterance}`.
    pub narrator: String,
    /// Slots: `{keywords}`.
    pub draft: String,
}

/// A complete, playable scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Human-readable title.
    pub title: String,
    /// Speaking roles.
    pub cast: Cast,
    /// Keyword vocabularies.
    pub vocabulary: Vocabulary,
    /// Initial transcript.
    pub opening: OpeningLines,
    /// Engine-authored notices.
    pub notices: Notices,
    /// Outcome reasons.
    pub endings: Endings,
    /// Collaborator prompts.
    pub prompts: PromptTemplates,
}

impl Scenario {
    /// Checks the scenario is playable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a vocabulary is too small or
    /// contains blank or duplicate tokens, or if any required text is blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.vocabulary.validate()?;

        let required = [
            ("title", &self.title),
            ("cast.player", &self.cast.player),
            ("cast.npc", &self.cast.npc),
            ("opening.system", &self.opening.system),
            ("opening.npc", &self.opening.npc),
            ("notices.timeout", &self.notices.timeout),
            ("notices.communication_fault", &self.notices.communication_fault),
            ("endings.victory", &self.endings.victory),
            ("endings.defeat", &self.endings.defeat),
            ("endings.timeout_defeat", &self.endings.timeout_defeat),
            ("prompts.judge", &self.prompts.judge),
            ("prompts.narrator", &self.prompts.narrator),
            ("prompts.draft", &self.prompts.draft),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!("{field} must not be blank")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::loader::builtin;

    #[test]
    fn test_builtin_scenario_is_valid() {
        let scenario = builtin().unwrap();
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.vocabulary.core.len(), 9);
        assert_eq!(scenario.vocabulary.noise.len(), 11);
        assert_eq!(scenario.vocabulary.trap.len(), 10);
    }

    #[test]
    fn test_short_trap_vocabulary_is_rejected() {
        let mut scenario = builtin().unwrap();
        scenario.vocabulary.trap.truncate(2);

        match scenario.validate().unwrap_err() {
            DomainError::Validation(msg) => {
                assert_eq!(msg, "trap vocabulary needs at least 3 tokens, found 2");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_token_shared_between_categories_is_rejected() {
        let mut scenario = builtin().unwrap();
        let shared = scenario.vocabulary.core[0].clone();
        scenario.vocabulary.noise.push(shared);

        assert!(matches!(
            scenario.validate(),
            Err(DomainError::Validation(msg)) if msg.contains("more than once")
        ));
    }

    #[test]
    fn test_blank_notice_is_rejected() {
        let mut scenario = builtin().unwrap();
        scenario.notices.timeout = "   ".to_owned();

        assert!(matches!(
            scenario.validate(),
            Err(DomainError::Validation(msg)) if msg == "notices.timeout must not be blank"
        ));
    }

    #[test]
    fn test_category_lookup() {
        let scenario = builtin().unwrap();
        let vocabulary = &scenario.vocabulary;

        assert!(vocabulary.is_core("信物"));
        assert!(vocabulary.is_trap("安禄山"));
        assert!(!vocabulary.is_core("喝茶"));
        assert!(!vocabulary.is_trap("喝茶"));
    }
}
