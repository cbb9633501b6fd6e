//! Shared application state.

use std::sync::{Arc, Mutex, RwLock};

use tracing::info;
use trickster_core::clock::Clock;
use trickster_core::error::DomainError;
use trickster_core::rng::DeterministicRng;
use trickster_scenario::Scenario;
use trickster_session::{Collaborators, GameSession};

/// Everything needed to start a fresh session.
#[derive(Clone)]
pub struct SessionFactory {
    /// Scenario every session is played against.
    pub scenario: Arc<Scenario>,
    /// Judge, narrator and draft assistant.
    pub collaborators: Collaborators,
    /// Clock stamping transcript lines.
    pub clock: Arc<dyn Clock>,
    /// RNG shared by every session's keyword sampler.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl SessionFactory {
    /// Starts a new session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the RNG mutex is poisoned.
    pub fn start(&self) -> Result<GameSession, DomainError> {
        GameSession::start(
            &self.scenario,
            self.collaborators.clone(),
            Arc::clone(&self.clock),
            Arc::clone(&self.rng),
        )
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    factory: Arc<SessionFactory>,
    current: Arc<RwLock<GameSession>>,
}

impl AppState {
    /// Create new application state with a freshly started session.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the session cannot start.
    pub fn new(factory: SessionFactory) -> Result<Self, DomainError> {
        let session = factory.start()?;
        Ok(Self {
            factory: Arc::new(factory),
            current: Arc::new(RwLock::new(session)),
        })
    }

    /// The live session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn session(&self) -> Result<GameSession, DomainError> {
        self.current
            .read()
            .map(|session| session.clone())
            .map_err(|e| DomainError::Infrastructure(format!("session lock poisoned: {e}")))
    }

    /// Discards the live session and starts a new one.
    ///
    /// Requests already in flight finish against the old session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned or the
    /// new session cannot start.
    pub fn reset(&self) -> Result<GameSession, DomainError> {
        let fresh = self.factory.start()?;
        let previous = {
            let mut current = self
                .current
                .write()
                .map_err(|e| DomainError::Infrastructure(format!("session lock poisoned: {e}")))?;
            std::mem::replace(&mut *current, fresh.clone())
        };
        previous.shutdown();
        info!("session reset");
        Ok(fresh)
    }
}
