//! Judgment reconciler: clamps score deltas and detects the end of the game.

use serde::Serialize;
use tracing::{info, warn};
use trickster_core::judgment::Judgment;
use trickster_scenario::Endings;

use super::state::{Outcome, Phase, SCORE_CEILING, Scores, SessionState};

/// Suspicion added when the countdown expires.
pub const TIMEOUT_PENALTY: i64 = 30;

/// Suspicion charged for a paid palette reroll.
pub const REROLL_PENALTY: i64 = 15;

/// A signed change to both meters. Any magnitude is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreDelta {
    /// Change to suspicion.
    pub suspicion: i64,
    /// Change to progress.
    pub progress: i64,
}

impl ScoreDelta {
    /// A suspicion-only change.
    #[must_use]
    pub fn suspicion(amount: i64) -> Self {
        Self {
            suspicion: amount,
            progress: 0,
        }
    }
}

impl From<&Judgment> for ScoreDelta {
    fn from(judgment: &Judgment) -> Self {
        Self {
            suspicion: judgment.suspicion_delta,
            progress: judgment.progress_delta,
        }
    }
}

/// How a reconciliation ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// Progress reached the ceiling.
    Victory,
    /// Suspicion reached the ceiling.
    Defeat,
}

/// Result of folding a delta into the current scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Clamped scores.
    pub next: Scores,
    /// Set when a threshold was reached.
    pub terminal: Option<Terminal>,
}

/// Which path produced a delta. Decides the defeat reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaSource {
    /// A judged player turn.
    Judge,
    /// The think-time countdown expired.
    Timeout,
}

/// Outcome of [`Reconciler::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    /// Scores were written.
    Applied(Reconciliation),
    /// The session had already ended; nothing changed.
    Frozen,
}

fn clamp_score(current: u8, delta: i64) -> u8 {
    let next = i64::from(current)
        .saturating_add(delta)
        .clamp(0, i64::from(SCORE_CEILING));
    u8::try_from(next).unwrap_or(SCORE_CEILING)
}

/// Pure reconciliation. Suspicion is checked first, so defeat wins when
/// both thresholds are crossed by the same delta.
#[must_use]
pub fn reconcile(current: Scores, delta: ScoreDelta) -> Reconciliation {
    let next = Scores {
        suspicion: clamp_score(current.suspicion, delta.suspicion),
        progress: clamp_score(current.progress, delta.progress),
    };
    let terminal = if next.suspicion >= SCORE_CEILING {
        Some(Terminal::Defeat)
    } else if next.progress >= SCORE_CEILING {
        Some(Terminal::Victory)
    } else {
        None
    };
    Reconciliation { next, terminal }
}

/// The sole writer of scores and of the ended phase.
#[derive(Debug, Clone)]
pub struct Reconciler {
    endings: Endings,
}

impl Reconciler {
    /// Creates a reconciler recording the scenario's ending reasons.
    #[must_use]
    pub fn new(endings: Endings) -> Self {
        Self { endings }
    }

    /// Folds `delta` into the session and ends it if a threshold is reached.
    ///
    /// Once the session has ended every call is a logged no-op.
    pub fn apply(
        &self,
        state: &mut SessionState,
        delta: ScoreDelta,
        source: DeltaSource,
    ) -> ApplyResult {
        if state.is_ended() {
            warn!(?delta, ?source, "session is frozen; ignoring score delta");
            return ApplyResult::Frozen;
        }

        let reconciliation = reconcile(state.scores, delta);
        state.scores = reconciliation.next;

        if let Some(terminal) = reconciliation.terminal {
            let outcome = match (terminal, source) {
                (Terminal::Victory, _) => Outcome {
                    victory: true,
                    reason: self.endings.victory.clone(),
                },
                (Terminal::Defeat, DeltaSource::Judge) => Outcome {
                    victory: false,
                    reason: self.endings.defeat.clone(),
                },
                (Terminal::Defeat, DeltaSource::Timeout) => Outcome {
                    victory: false,
                    reason: self.endings.timeout_defeat.clone(),
                },
            };
            info!(?terminal, ?source, reason = %outcome.reason, "session ended");
            state.phase = Phase::Ended(outcome);
        }

        ApplyResult::Applied(reconciliation)
    }

    /// Clamps `delta` into the scores without evaluating thresholds.
    ///
    /// Used for the reroll cost, which may never end the session by itself.
    /// Returns `None` if the session has already ended.
    pub fn absorb(&self, state: &mut SessionState, delta: ScoreDelta) -> Option<Scores> {
        if state.is_ended() {
            warn!(?delta, "session is frozen; ignoring penalty");
            return None;
        }
        state.scores = reconcile(state.scores, delta).next;
        Some(state.scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::keywords::KeywordPalette;
    use trickster_core::clock::Clock;
    use trickster_core::rng::{DeterministicRng, StdRandom};
    use trickster_scenario::application::loader::builtin;
    use trickster_test_support::fixed_clock;

    fn scores(suspicion: u8, progress: u8) -> Scores {
        Scores {
            suspicion,
            progress,
        }
    }

    fn fixture() -> (Reconciler, SessionState) {
        let scenario = builtin().unwrap();
        let state = SessionState::new(&scenario, KeywordPalette::default(), fixed_clock().now());
        (Reconciler::new(scenario.endings), state)
    }

    #[test]
    fn test_reconcile_applies_small_deltas() {
        let result = reconcile(scores(30, 0), ScoreDelta { suspicion: -5, progress: 10 });

        assert_eq!(result.next, scores(25, 10));
        assert_eq!(result.terminal, None);
    }

    #[test]
    fn test_reconcile_clamps_to_ceiling_and_defeats() {
        let result = reconcile(scores(75, 0), ScoreDelta::suspicion(35));

        assert_eq!(result.next.suspicion, 100);
        assert_eq!(result.terminal, Some(Terminal::Defeat));
    }

    #[test]
    fn test_reconcile_clamps_progress_and_wins() {
        let result = reconcile(scores(30, 95), ScoreDelta { suspicion: 0, progress: 25 });

        assert_eq!(result.next.progress, 100);
        assert_eq!(result.terminal, Some(Terminal::Victory));
    }

    #[test]
    fn test_reconcile_clamps_at_floor() {
        let result = reconcile(scores(3, 2), ScoreDelta { suspicion: -50, progress: -40 });

        assert_eq!(result.next, scores(0, 0));
        assert_eq!(result.terminal, None);
    }

    #[test]
    fn test_defeat_wins_when_both_thresholds_cross() {
        let result = reconcile(scores(90, 90), ScoreDelta { suspicion: 20, progress: 20 });

        assert_eq!(result.next, scores(100, 100));
        assert_eq!(result.terminal, Some(Terminal::Defeat));
    }

    #[test]
    fn test_reconcile_absorbs_extreme_deltas() {
        let high = reconcile(scores(50, 50), ScoreDelta { suspicion: i64::MAX, progress: i64::MIN });
        assert_eq!(high.next, scores(100, 0));

        let low = reconcile(scores(50, 50), ScoreDelta { suspicion: i64::MIN, progress: 0 });
        assert_eq!(low.next, scores(0, 50));
    }

    #[test]
    fn test_scores_stay_in_range_for_random_delta_sequences() {
        let mut rng = StdRandom::seeded(2026);
        let mut current = scores(30, 0);

        for _ in 0..2_000 {
            let suspicion = i64::from(rng.next_u32_range(0, 400)) - 200;
            let progress = i64::from(rng.next_u32_range(0, 400)) - 200;
            current = reconcile(current, ScoreDelta { suspicion, progress }).next;

            assert!(current.suspicion <= 100);
            assert!(current.progress <= 100);
        }
    }

    #[test]
    fn test_apply_writes_scores_and_records_judge_defeat_reason() {
        let (reconciler, mut state) = fixture();

        let result = reconciler.apply(&mut state, ScoreDelta::suspicion(70), DeltaSource::Judge);

        assert!(matches!(
            result,
            ApplyResult::Applied(Reconciliation { terminal: Some(Terminal::Defeat), .. })
        ));
        let outcome = state.outcome().unwrap();
        assert!(!outcome.victory);
        assert_eq!(outcome.reason, "怀疑度爆表，卫兵已入门，你被当场拿下。");
    }

    #[test]
    fn test_apply_records_timeout_defeat_reason() {
        let (reconciler, mut state) = fixture();
        state.scores = scores(80, 0);

        reconciler.apply(&mut state, ScoreDelta::suspicion(TIMEOUT_PENALTY), DeltaSource::Timeout);

        assert_eq!(state.outcome().unwrap().reason, "因反应迟钝被怀疑是假冒的。");
    }

    #[test]
    fn test_apply_records_victory() {
        let (reconciler, mut state) = fixture();
        state.scores = scores(30, 95);

        reconciler.apply(&mut state, ScoreDelta { suspicion: 0, progress: 25 }, DeltaSource::Judge);

        assert_eq!(state.scores(), scores(30, 100));
        assert!(state.outcome().unwrap().victory);
    }

    #[test]
    fn test_apply_after_end_is_frozen_noop() {
        let (reconciler, mut state) = fixture();
        reconciler.apply(&mut state, ScoreDelta { suspicion: 0, progress: 100 }, DeltaSource::Judge);
        let frozen_scores = state.scores();
        let frozen_outcome = state.outcome().cloned();

        let result = reconciler.apply(&mut state, ScoreDelta::suspicion(100), DeltaSource::Judge);

        assert_eq!(result, ApplyResult::Frozen);
        assert_eq!(state.scores(), frozen_scores);
        assert_eq!(state.outcome().cloned(), frozen_outcome);
        assert_eq!(reconciler.absorb(&mut state, ScoreDelta::suspicion(5)), None);
    }

    #[test]
    fn test_absorb_clamps_without_ending() {
        let (reconciler, mut state) = fixture();
        state.scores = scores(95, 0);

        let next = reconciler.absorb(&mut state, ScoreDelta::suspicion(REROLL_PENALTY));

        assert_eq!(next, Some(scores(100, 0)));
        assert!(!state.is_ended());
    }

    #[test]
    fn test_delta_from_judgment() {
        let judgment = Judgment {
            suspicion_delta: -5,
            progress_delta: 10,
            reason: String::new(),
            npc_state: String::new(),
        };

        assert_eq!(ScoreDelta::from(&judgment), ScoreDelta { suspicion: -5, progress: 10 });
    }
}
