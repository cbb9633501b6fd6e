//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A validation error in domain logic or content.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure error (poisoned lock, unreadable file, ...).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Failure reported by an external text-generation collaborator.
///
/// Every variant is recoverable: the turn machine logs it, posts a notice,
/// and hands control back to the player.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The request never produced a response (connection, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("collaborator returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Body or reason phrase returned with the status.
        message: String,
    },

    /// The service answered but carried no usable content.
    #[error("collaborator returned no content")]
    EmptyResponse,
}
