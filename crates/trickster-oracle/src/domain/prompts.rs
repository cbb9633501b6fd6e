//! Prompt rendering for the three collaborators.

use trickster_core::collaborator::{JudgeRequest, NarratorRequest};
use trickster_scenario::PromptTemplates;
use trickster_scenario::domain::template::render;

/// Separator between keywords in the judge prompt.
const JUDGE_KEYWORD_SEPARATOR: &str = "、";

/// Separator between keywords in the draft prompt.
const DRAFT_KEYWORD_SEPARATOR: &str = ",";

/// Renders the judge prompt for one turn.
#[must_use]
pub fn judge_prompt(templates: &PromptTemplates, request: &JudgeRequest) -> String {
    let keywords = request.selected_keywords.join(JUDGE_KEYWORD_SEPARATOR);
    let suspicion = request.suspicion.to_string();
    render(
        &templates.judge,
        &[
            ("utterance", request.utterance.as_str()),
            ("keywords", keywords.as_str()),
            ("suspicion", suspicion.as_str()),
        ],
    )
}

/// Renders the narrator prompt for a non-terminal turn.
#[must_use]
pub fn narrator_prompt(templates: &PromptTemplates, request: &NarratorRequest) -> String {
    render(
        &templates.narrator,
        &[
            ("reason", request.judgment.reason.as_str()),
            ("npc_state", request.judgment.npc_state.as_str()),
            ("utterance", request.utterance.as_str()),
        ],
    )
}

/// Renders the draft prompt for the selected keywords.
#[must_use]
pub fn draft_prompt(templates: &PromptTemplates, keywords: &[String]) -> String {
    let keywords = keywords.join(DRAFT_KEYWORD_SEPARATOR);
    render(&templates.draft, &[("keywords", keywords.as_str())])
}
