//! Application layer for the session context.

pub mod game;
pub mod query_handlers;
pub mod timer;
