//! Shared test mocks and utilities for the Chrono Trickster game engine.

mod clock;
mod collaborators;
mod rng;

pub use clock::{FixedClock, fixed_clock};
pub use collaborators::{
    FailingDraftAssist, FailingJudge, FailingNarrator, ScriptedDraftAssist, ScriptedJudge,
    ScriptedNarrator,
};
pub use rng::{MockRng, SequenceRng};
