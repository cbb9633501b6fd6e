//! Session store: the mutable state one game session reads and writes.
//!
//! Fields are crate-private. Each kind of write belongs to one component:
//! the reconciler writes scores and the ended phase, the turn state machine
//! writes the transcript, the working phases and the palette, the draft
//! assistant writes only the pending input.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use trickster_core::judgment::Judgment;
use trickster_scenario::Scenario;

use super::keywords::{KeywordPalette, KeywordSelection};

/// Think time per turn, in seconds.
pub const MAX_TIME: u32 = 40;

/// Suspicion a fresh session starts with.
pub const INITIAL_SUSPICION: u8 = 30;

/// Progress a fresh session starts with.
pub const INITIAL_PROGRESS: u8 = 0;

/// Upper bound of both meters.
pub const SCORE_CEILING: u8 = 100;

/// Who spoke a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The player.
    Player,
    /// The scripted NPC.
    Npc,
    /// The engine itself.
    System,
}

/// One transcript line. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnEntry {
    /// Who spoke.
    pub speaker: Speaker,
    /// Name shown with the line, if any.
    pub display_name: Option<String>,
    /// The line itself.
    pub text: String,
    /// When the line was appended.
    pub recorded_at: DateTime<Utc>,
}

/// The two meters, both within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scores {
    /// The NPC's distrust.
    pub suspicion: u8,
    /// Task completion.
    pub progress: u8,
}

impl Default for Scores {
    fn default() -> Self {
        Self {
            suspicion: INITIAL_SUSPICION,
            progress: INITIAL_PROGRESS,
        }
    }
}

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// `true` on victory, `false` on defeat.
    pub victory: bool,
    /// Scenario text explaining the ending.
    pub reason: String,
}

/// Turn phase. `Ended` carries the outcome, so an ended session without an
/// outcome cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the player; the countdown is running.
    AwaitingInput,
    /// A turn is in flight; the countdown is disarmed.
    Processing,
    /// The session is over and frozen.
    Ended(Outcome),
}

impl Phase {
    /// Stable name for logs and views.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AwaitingInput => "awaiting_input",
            Self::Processing => "processing",
            Self::Ended(_) => "ended",
        }
    }
}

/// Why an action was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The utterance was empty after trimming.
    EmptyUtterance,
    /// A draft was requested with no keywords selected.
    NoKeywordsSelected,
    /// A turn is already in flight.
    Busy,
    /// The session has ended.
    SessionEnded,
    /// A turn or reroll ran while the request was in flight.
    Superseded,
}

/// All mutable state of one session.
#[derive(Debug)]
pub struct SessionState {
    pub(crate) scores: Scores,
    pub(crate) transcript: Vec<TurnEntry>,
    pub(crate) analysis_log: VecDeque<Judgment>,
    pub(crate) palette: KeywordPalette,
    pub(crate) selection: KeywordSelection,
    pub(crate) phase: Phase,
    pub(crate) pending_input: Option<String>,
    /// Bumped whenever a turn starts or the palette changes.
    pub(crate) revision: u64,
}

impl SessionState {
    /// Creates a fresh session seeded with the scenario's opening lines.
    #[must_use]
    pub fn new(scenario: &Scenario, palette: KeywordPalette, now: DateTime<Utc>) -> Self {
        let mut state = Self {
            scores: Scores::default(),
            transcript: Vec::new(),
            analysis_log: VecDeque::new(),
            palette,
            selection: KeywordSelection::default(),
            phase: Phase::AwaitingInput,
            pending_input: None,
            revision: 0,
        };
        state.record(Speaker::System, None, scenario.opening.system.clone(), now);
        state.record(
            Speaker::Npc,
            Some(scenario.cast.npc.clone()),
            scenario.opening.npc.clone(),
            now,
        );
        state
    }

    /// Current meters.
    #[must_use]
    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The outcome, once the session has ended.
    #[must_use]
    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Phase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Returns `true` once the session has ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    /// Transcript, oldest first.
    #[must_use]
    pub fn transcript(&self) -> &[TurnEntry] {
        &self.transcript
    }

    /// Judgments, most recent first.
    #[must_use]
    pub fn analysis_log(&self) -> &VecDeque<Judgment> {
        &self.analysis_log
    }

    /// The current palette.
    #[must_use]
    pub fn palette(&self) -> &KeywordPalette {
        &self.palette
    }

    /// Keywords currently selected.
    #[must_use]
    pub fn selected_keywords(&self) -> &[String] {
        self.selection.tokens()
    }

    /// Suggested input produced by the draft assistant.
    #[must_use]
    pub fn pending_input(&self) -> Option<&str> {
        self.pending_input.as_deref()
    }

    pub(crate) fn record(
        &mut self,
        speaker: Speaker,
        display_name: Option<String>,
        text: String,
        now: DateTime<Utc>,
    ) {
        self.transcript.push(TurnEntry {
            speaker,
            display_name,
            text,
            recorded_at: now,
        });
    }

    /// Installs a new palette. The selection never survives a palette change.
    pub(crate) fn replace_palette(&mut self, palette: KeywordPalette) {
        self.palette = palette;
        self.selection.clear();
        self.revision += 1;
    }

    /// Enters `Processing` for a new turn and drops any pending draft.
    pub(crate) fn begin_turn(&mut self) {
        self.phase = Phase::Processing;
        self.pending_input = None;
        self.revision += 1;
    }

    /// Why a turn with `utterance` cannot start now, if it cannot.
    pub(crate) fn submit_rejection(&self, utterance: &str) -> Option<Rejection> {
        match self.phase {
            Phase::Ended(_) => Some(Rejection::SessionEnded),
            Phase::Processing => Some(Rejection::Busy),
            Phase::AwaitingInput if utterance.is_empty() => Some(Rejection::EmptyUtterance),
            Phase::AwaitingInput => None,
        }
    }

    /// Why an out-of-turn action (reroll, draft) cannot run now, if it cannot.
    pub(crate) fn idle_rejection(&self) -> Option<Rejection> {
        match self.phase {
            Phase::Ended(_) => Some(Rejection::SessionEnded),
            Phase::Processing => Some(Rejection::Busy),
            Phase::AwaitingInput => None,
        }
    }
}
