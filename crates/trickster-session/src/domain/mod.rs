//! Domain layer for the session context.

pub mod commands;
pub mod keywords;
pub mod reconciler;
pub mod state;
