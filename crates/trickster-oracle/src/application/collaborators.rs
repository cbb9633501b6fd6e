//! `Judge`, `Narrator` and `DraftAssist` backed by a [`ChatClient`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use trickster_core::collaborator::{DraftAssist, Judge, JudgeRequest, Narrator, NarratorRequest};
use trickster_core::error::CollaboratorError;
use trickster_core::judgment::Judgment;
use trickster_scenario::PromptTemplates;

use crate::application::client::ChatClient;
use crate::domain::prompts::{draft_prompt, judge_prompt, narrator_prompt};

/// Scores turns by asking the model for a JSON judgment.
#[derive(Debug, Clone)]
pub struct ChatJudge {
    client: Arc<ChatClient>,
    templates: Arc<PromptTemplates>,
}

impl ChatJudge {
    /// Creates a judge.
    #[must_use]
    pub fn new(client: Arc<ChatClient>, templates: Arc<PromptTemplates>) -> Self {
        Self { client, templates }
    }
}

#[async_trait]
impl Judge for ChatJudge {
    #[instrument(skip_all, fields(suspicion = request.suspicion))]
    async fn judge(&self, request: &JudgeRequest) -> Result<Judgment, CollaboratorError> {
        let prompt = judge_prompt(&self.templates, request);
        let reply = self.client.complete(&prompt, true).await?;
        let judgment = Judgment::from_response_text(&reply);
        debug!(?judgment, "judgment parsed");
        Ok(judgment)
    }
}

/// Voices the NPC.
#[derive(Debug, Clone)]
pub struct ChatNarrator {
    client: Arc<ChatClient>,
    templates: Arc<PromptTemplates>,
}

impl ChatNarrator {
    /// Creates a narrator.
    #[must_use]
    pub fn new(client: Arc<ChatClient>, templates: Arc<PromptTemplates>) -> Self {
        Self { client, templates }
    }
}

#[async_trait]
impl Narrator for ChatNarrator {
    #[instrument(skip_all)]
    async fn narrate(&self, request: &NarratorRequest) -> Result<String, CollaboratorError> {
        let prompt = narrator_prompt(&self.templates, request);
        self.client.complete(&prompt, false).await
    }
}

/// Suggests a player line.
#[derive(Debug, Clone)]
pub struct ChatDraftAssist {
    client: Arc<ChatClient>,
    templates: Arc<PromptTemplates>,
}

impl ChatDraftAssist {
    /// Creates a draft assistant.
    #[must_use]
    pub fn new(client: Arc<ChatClient>, templates: Arc<PromptTemplates>) -> Self {
        Self { client, templates }
    }
}

#[async_trait]
impl DraftAssist for ChatDraftAssist {
    #[instrument(skip_all, fields(keywords = keywords.len()))]
    async fn draft(&self, keywords: &[String]) -> Result<String, CollaboratorError> {
        let prompt = draft_prompt(&self.templates, keywords);
        self.client.complete(&prompt, false).await
    }
}
