//! Domain layer for the oracle context.

pub mod prompts;
pub mod wire;
