//! Application layer for the oracle context.

pub mod client;
pub mod collaborators;
