//! Application layer for the scenario context.

pub mod loader;
