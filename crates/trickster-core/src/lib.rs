//! Chrono Trickster Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the game
//! crates depend on. It contains no infrastructure code.

pub mod clock;
pub mod collaborator;
pub mod command;
pub mod error;
pub mod judgment;
pub mod rng;
