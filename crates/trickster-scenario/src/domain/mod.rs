//! Domain layer for the scenario context.

pub mod scenario;
pub mod template;
