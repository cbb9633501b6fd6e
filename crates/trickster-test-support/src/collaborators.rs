//! Test collaborators — scripted and failing `Judge`, `Narrator` and
//! `DraftAssist` implementations.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;
use trickster_core::collaborator::{
    DraftAssist, Judge, JudgeRequest, Narrator, NarratorRequest,
};
use trickster_core::error::CollaboratorError;
use trickster_core::judgment::Judgment;

/// A judge that returns queued judgments in order and records every
/// request. Once the queue is empty it returns an all-zero judgment.
///
/// A gated judge parks each call until [`ScriptedJudge::release`] is called,
/// which lets tests observe the session mid-turn.
#[derive(Debug, Default)]
pub struct ScriptedJudge {
    judgments: Mutex<VecDeque<Judgment>>,
    requests: Mutex<Vec<JudgeRequest>>,
    gate: Option<Notify>,
}

impl ScriptedJudge {
    /// Create a judge that answers with `judgments`, one per call.
    #[must_use]
    pub fn new(judgments: Vec<Judgment>) -> Self {
        Self {
            judgments: Mutex::new(judgments.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Create a judge whose calls block until released.
    #[must_use]
    pub fn gated(judgments: Vec<Judgment>) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new(judgments)
        }
    }

    /// Let one parked (or the next) call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Returns a snapshot of all requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<JudgeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Judge for ScriptedJudge {
    async fn judge(&self, request: &JudgeRequest) -> Result<Judgment, CollaboratorError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.judgments.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// A judge whose every call fails with a transport error.
#[derive(Debug)]
pub struct FailingJudge;

#[async_trait]
impl Judge for FailingJudge {
    async fn judge(&self, _request: &JudgeRequest) -> Result<Judgment, CollaboratorError> {
        Err(CollaboratorError::Transport("connection refused".into()))
    }
}

/// A narrator that returns queued replies in order and records every
/// request. Once the queue is empty it returns an empty reply.
#[derive(Debug, Default)]
pub struct ScriptedNarrator {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<NarratorRequest>>,
}

impl ScriptedNarrator {
    /// Create a narrator that answers with `replies`, one per call.
    #[must_use]
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_owned).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<NarratorRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Narrator for ScriptedNarrator {
    async fn narrate(&self, request: &NarratorRequest) -> Result<String, CollaboratorError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
    }
}

/// A narrator whose every call fails with a status error.
#[derive(Debug)]
pub struct FailingNarrator;

#[async_trait]
impl Narrator for FailingNarrator {
    async fn narrate(&self, _request: &NarratorRequest) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Status {
            status: 503,
            message: "service unavailable".into(),
        })
    }
}

/// A draft assistant that always answers with the same line and records
/// the keyword sets it was asked about. A gated assistant parks each call
/// until [`ScriptedDraftAssist::release`] is called.
#[derive(Debug)]
pub struct ScriptedDraftAssist {
    line: String,
    requests: Mutex<Vec<Vec<String>>>,
    gate: Option<Notify>,
}

impl ScriptedDraftAssist {
    /// Create a draft assistant answering with `line`.
    #[must_use]
    pub fn new(line: &str) -> Self {
        Self {
            line: line.to_owned(),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Create a draft assistant whose calls block until released.
    #[must_use]
    pub fn gated(line: &str) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new(line)
        }
    }

    /// Let one parked (or the next) call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Returns a snapshot of the keyword sets received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DraftAssist for ScriptedDraftAssist {
    async fn draft(&self, keywords: &[String]) -> Result<String, CollaboratorError> {
        self.requests.lock().unwrap().push(keywords.to_vec());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.line.clone())
    }
}

/// A draft assistant whose every call comes back empty-handed.
#[derive(Debug)]
pub struct FailingDraftAssist;

#[async_trait]
impl DraftAssist for FailingDraftAssist {
    async fn draft(&self, _keywords: &[String]) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::EmptyResponse)
    }
}
