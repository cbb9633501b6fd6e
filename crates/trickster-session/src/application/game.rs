//! Turn state machine.
//!
//! `AwaitingInput --submit--> Processing --> AwaitingInput | Ended`.
//!
//! The session mutex is locked only around synchronous state changes and is
//! never held across a collaborator call. The countdown is disarmed before a
//! turn starts processing and rearmed only once the turn has settled.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use trickster_core::clock::Clock;
use trickster_core::collaborator::{
    DraftAssist, Judge, JudgeRequest, Narrator, NarratorRequest,
};
use trickster_core::command::Command;
use trickster_core::error::{CollaboratorError, DomainError};
use trickster_core::rng::DeterministicRng;
use trickster_scenario::{Cast, Notices, Scenario};

use crate::application::timer::{CountdownTimer, TimeoutListener};
use crate::domain::commands::{RerollPalette, RequestDraft, SubmitUtterance, ToggleKeyword};
use crate::domain::keywords::{KeywordPalette, KeywordSampler, SelectionResult};
use crate::domain::reconciler::{
    ApplyResult, DeltaSource, REROLL_PENALTY, Reconciler, ScoreDelta, TIMEOUT_PENALTY,
};
use crate::domain::state::{MAX_TIME, Outcome, Phase, Rejection, SessionState, Speaker};

/// Reply recorded when the narrator answers with nothing.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "...";

/// Outcome of a submitted utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TurnResult {
    /// Nothing happened.
    Rejected {
        /// Why.
        reason: Rejection,
    },
    /// The turn was judged and narrated; the next turn is open.
    Continued,
    /// The turn ended the session.
    Ended {
        /// How it ended.
        outcome: Outcome,
    },
    /// A collaborator failed; a notice was posted and the turn reopened.
    Faulted,
}

/// Outcome of a paid palette reroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RerollResult {
    /// A new palette is on offer and the cost was charged.
    Rerolled {
        /// Suspicion after the charge.
        suspicion: u8,
    },
    /// Nothing happened.
    Rejected {
        /// Why.
        reason: Rejection,
    },
}

/// Outcome of a draft request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DraftResult {
    /// The suggestion now sits in the pending input.
    Drafted {
        /// The suggested line.
        line: String,
    },
    /// Nothing happened.
    Rejected {
        /// Why.
        reason: Rejection,
    },
    /// The draft assistant failed; the pending input is unchanged.
    Faulted,
}

/// The collaborators one session talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Scores turns.
    pub judge: Arc<dyn Judge>,
    /// Voices the NPC.
    pub narrator: Arc<dyn Narrator>,
    /// Suggests player lines.
    pub draft_assist: Arc<dyn DraftAssist>,
}

struct GameInner {
    state: Mutex<SessionState>,
    sampler: KeywordSampler,
    reconciler: Reconciler,
    timer: CountdownTimer,
    collaborators: Collaborators,
    clock: Arc<dyn Clock>,
    rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    cast: Cast,
    notices: Notices,
    this: Weak<GameInner>,
}

/// One live game session.
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct GameSession {
    inner: Arc<GameInner>,
}

impl GameSession {
    /// Starts a session: draws the first palette, seeds the opening
    /// transcript and arms the countdown.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the RNG mutex is poisoned.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(
        scenario: &Scenario,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Result<Self, DomainError> {
        let sampler = KeywordSampler::new(scenario.vocabulary.clone());
        let palette = draw_palette(&sampler, &rng)?;
        let state = SessionState::new(scenario, palette, clock.now());

        let inner = Arc::new_cyclic(|this| GameInner {
            state: Mutex::new(state),
            sampler,
            reconciler: Reconciler::new(scenario.endings.clone()),
            timer: CountdownTimer::new(Duration::from_secs(u64::from(MAX_TIME))),
            collaborators,
            clock,
            rng,
            cast: scenario.cast.clone(),
            notices: scenario.notices.clone(),
            this: this.clone(),
        });
        inner.arm_timer();

        info!(title = %scenario.title, "game session started");
        Ok(Self { inner })
    }

    /// Plays one turn.
    ///
    /// Empty utterances and submissions while a turn is in flight or after
    /// the end are ignored. Collaborator failures are recovered locally.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` only if a session mutex is
    /// poisoned.
    pub async fn submit(&self, command: &SubmitUtterance) -> Result<TurnResult, DomainError> {
        let inner = &self.inner;
        let utterance = command.text.trim().to_owned();

        let request = {
            let mut state = inner.lock_state()?;
            if let Some(reason) = state.submit_rejection(&utterance) {
                debug!(
                    correlation_id = %command.correlation_id(),
                    command = command.command_type(),
                    ?reason,
                    "submission ignored"
                );
                return Ok(TurnResult::Rejected { reason });
            }

            inner.timer.cancel();
            state.begin_turn();
            state.record(
                Speaker::Player,
                Some(inner.cast.player.clone()),
                utterance.clone(),
                inner.clock.now(),
            );
            JudgeRequest {
                utterance: utterance.clone(),
                selected_keywords: state.selected_keywords().to_vec(),
                suspicion: state.scores().suspicion,
            }
        };

        let vocabulary = inner.sampler.vocabulary();
        let keywords = &request.selected_keywords;
        let core_hits = keywords.iter().filter(|t| vocabulary.is_core(t)).count();
        let trap_hits = keywords.iter().filter(|t| vocabulary.is_trap(t)).count();
        info!(
            correlation_id = %command.correlation_id(),
            command = command.command_type(),
            ?keywords,
            core_hits,
            trap_hits,
            suspicion = request.suspicion,
            "judging turn"
        );

        let judgment = match inner.collaborators.judge.judge(&request).await {
            Ok(judgment) => judgment,
            Err(error) => return inner.recover(command, "judge", &error),
        };

        {
            let mut state = inner.lock_state()?;
            state.analysis_log.push_front(judgment.clone());
            let applied =
                inner
                    .reconciler
                    .apply(&mut state, ScoreDelta::from(&judgment), DeltaSource::Judge);
            info!(
                correlation_id = %command.correlation_id(),
                suspicion_delta = judgment.suspicion_delta,
                progress_delta = judgment.progress_delta,
                npc_state = %judgment.npc_state,
                "turn judged"
            );
            if let ApplyResult::Frozen = applied {
                return Ok(TurnResult::Rejected {
                    reason: Rejection::SessionEnded,
                });
            }
            if let Some(outcome) = state.outcome() {
                return Ok(TurnResult::Ended {
                    outcome: outcome.clone(),
                });
            }
        }

        let narration = NarratorRequest {
            judgment,
            utterance,
        };
        let reply = match inner.collaborators.narrator.narrate(&narration).await {
            Ok(reply) => reply,
            Err(error) => return inner.recover(command, "narrator", &error),
        };

        {
            let mut state = inner.lock_state()?;
            let text = if reply.trim().is_empty() {
                EMPTY_REPLY_PLACEHOLDER.to_owned()
            } else {
                reply
            };
            state.record(
                Speaker::Npc,
                Some(inner.cast.npc.clone()),
                text,
                inner.clock.now(),
            );
            let palette = inner.draw_palette()?;
            state.replace_palette(palette);
            state.phase = Phase::AwaitingInput;
        }
        inner.arm_timer();

        debug!(correlation_id = %command.correlation_id(), "turn complete");
        Ok(TurnResult::Continued)
    }

    /// Selects or deselects a keyword on the current palette.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the session mutex is poisoned.
    pub fn toggle(&self, command: &ToggleKeyword) -> Result<SelectionResult, DomainError> {
        let mut state = self.inner.lock_state()?;
        if state.is_ended() {
            return Ok(SelectionResult::SessionEnded);
        }
        let state = &mut *state;
        let result = state.selection.toggle(&state.palette, &command.token);
        debug!(
            correlation_id = %command.correlation_id(),
            command = command.command_type(),
            token = %command.token,
            ?result,
            "keyword toggled"
        );
        Ok(result)
    }

    /// Buys a fresh palette at a fixed suspicion cost.
    ///
    /// The cost is clamped but can never end the session by itself.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a session mutex is poisoned.
    pub fn reroll(&self, command: &RerollPalette) -> Result<RerollResult, DomainError> {
        let inner = &self.inner;
        let mut state = inner.lock_state()?;
        if let Some(reason) = state.idle_rejection() {
            debug!(
                correlation_id = %command.correlation_id(),
                command = command.command_type(),
                ?reason,
                "reroll ignored"
            );
            return Ok(RerollResult::Rejected { reason });
        }

        let Some(scores) = inner
            .reconciler
            .absorb(&mut state, ScoreDelta::suspicion(REROLL_PENALTY))
        else {
            return Ok(RerollResult::Rejected {
                reason: Rejection::SessionEnded,
            });
        };
        let palette = inner.draw_palette()?;
        state.replace_palette(palette);

        info!(
            correlation_id = %command.correlation_id(),
            command = command.command_type(),
            suspicion = scores.suspicion,
            "palette rerolled"
        );
        Ok(RerollResult::Rerolled {
            suspicion: scores.suspicion,
        })
    }

    /// Asks the draft assistant for a line using the selected keywords.
    ///
    /// Only the pending input is ever written.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the session mutex is poisoned.
    pub async fn draft(&self, command: &RequestDraft) -> Result<DraftResult, DomainError> {
        let inner = &self.inner;
        let (keywords, revision) = {
            let state = inner.lock_state()?;
            if let Some(reason) = state.idle_rejection() {
                return Ok(DraftResult::Rejected { reason });
            }
            if state.selected_keywords().is_empty() {
                return Ok(DraftResult::Rejected {
                    reason: Rejection::NoKeywordsSelected,
                });
            }
            (state.selected_keywords().to_vec(), state.revision)
        };

        let line = match inner.collaborators.draft_assist.draft(&keywords).await {
            Ok(line) => clean_draft(&line),
            Err(error) => {
                warn!(
                    correlation_id = %command.correlation_id(),
                    command = command.command_type(),
                    %error,
                    "draft assistant failed"
                );
                return Ok(DraftResult::Faulted);
            }
        };

        let mut state = inner.lock_state()?;
        if state.is_ended() {
            return Ok(DraftResult::Rejected {
                reason: Rejection::SessionEnded,
            });
        }
        if state.revision != revision {
            debug!(correlation_id = %command.correlation_id(), "stale draft discarded");
            return Ok(DraftResult::Rejected {
                reason: Rejection::Superseded,
            });
        }
        state.pending_input = Some(line.clone());
        debug!(
            correlation_id = %command.correlation_id(),
            command = command.command_type(),
            "draft ready"
        );
        Ok(DraftResult::Drafted { line })
    }

    /// Disarms the countdown. Used when the session is being replaced.
    pub fn shutdown(&self) {
        self.inner.timer.cancel();
        info!("game session shut down");
    }

    pub(crate) fn state(&self) -> Result<MutexGuard<'_, SessionState>, DomainError> {
        self.inner.lock_state()
    }

    pub(crate) fn timer(&self) -> &CountdownTimer {
        &self.inner.timer
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("timer", &self.inner.timer)
            .finish_non_exhaustive()
    }
}

impl GameInner {
    fn lock_state(&self) -> Result<MutexGuard<'_, SessionState>, DomainError> {
        self.state
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("session mutex poisoned: {e}")))
    }

    fn draw_palette(&self) -> Result<KeywordPalette, DomainError> {
        draw_palette(&self.sampler, &self.rng)
    }

    fn arm_timer(&self) {
        let listener: Weak<dyn TimeoutListener> = self.this.clone();
        self.timer.arm(listener);
    }

    /// Posts the fault notice and hands the turn back to the player.
    /// Scores are left as they are.
    fn recover(
        &self,
        command: &SubmitUtterance,
        collaborator: &'static str,
        error: &CollaboratorError,
    ) -> Result<TurnResult, DomainError> {
        warn!(
            correlation_id = %command.correlation_id(),
            command = command.command_type(),
            collaborator,
            %error,
            "collaborator failed; reopening turn"
        );
        {
            let mut state = self.lock_state()?;
            state.record(
                Speaker::System,
                None,
                self.notices.communication_fault.clone(),
                self.clock.now(),
            );
            state.phase = Phase::AwaitingInput;
        }
        self.arm_timer();
        Ok(TurnResult::Faulted)
    }
}

impl TimeoutListener for GameInner {
    fn on_timeout(&self) {
        let rearm = match self.lock_state() {
            Ok(mut state) => {
                if state.phase == Phase::AwaitingInput {
                    info!("think time expired");
                    state.record(
                        Speaker::System,
                        None,
                        self.notices.timeout.clone(),
                        self.clock.now(),
                    );
                    let applied = self.reconciler.apply(
                        &mut state,
                        ScoreDelta::suspicion(TIMEOUT_PENALTY),
                        DeltaSource::Timeout,
                    );
                    matches!(applied, ApplyResult::Applied(r) if r.terminal.is_none())
                } else {
                    debug!(phase = state.phase.name(), "stale timeout ignored");
                    false
                }
            }
            Err(error) => {
                warn!(%error, "timeout could not be applied");
                false
            }
        };

        if rearm {
            self.arm_timer();
        }
    }
}

fn draw_palette(
    sampler: &KeywordSampler,
    rng: &Mutex<dyn DeterministicRng + Send>,
) -> Result<KeywordPalette, DomainError> {
    let mut rng = rng
        .lock()
        .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
    Ok(sampler.refresh(&mut *rng))
}

/// Trims a drafted line and strips one pair of surrounding double quotes.
fn clean_draft(line: &str) -> String {
    let line = line.trim();
    let line = line.strip_prefix('"').unwrap_or(line);
    let line = line.strip_suffix('"').unwrap_or(line);
    line.to_owned()
}
