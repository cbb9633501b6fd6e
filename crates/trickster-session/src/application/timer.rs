//! Think-time countdown.
//!
//! At most one deadline is armed at a time. Arming replaces (and aborts) any
//! previous deadline; expiry disarms the timer before the listener runs, so
//! the listener may rearm it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Receives the timeout event.
pub trait TimeoutListener: Send + Sync {
    /// Called once per armed deadline that expires without being cancelled.
    fn on_timeout(&self);
}

#[derive(Debug)]
struct Armed {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
struct Slot {
    armed: Option<Armed>,
    remaining_when_idle: Duration,
}

/// A single-shot, re-armable countdown driven by the Tokio clock.
#[derive(Debug)]
pub struct CountdownTimer {
    duration: Duration,
    slot: Arc<Mutex<Slot>>,
    generation: AtomicU64,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    // The slot holds no invariants a panic could break halfway.
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CountdownTimer {
    /// Creates a disarmed timer that will count down `duration` once armed.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            slot: Arc::new(Mutex::new(Slot {
                armed: None,
                remaining_when_idle: duration,
            })),
            generation: AtomicU64::new(0),
        }
    }

    /// Arms a fresh deadline, replacing any armed one.
    ///
    /// The listener is held weakly; if it is gone at expiry nothing fires.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn arm(&self, listener: Weak<dyn TimeoutListener>) {
        let mut slot = lock(&self.slot);
        if let Some(previous) = slot.armed.take() {
            previous.handle.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let deadline = Instant::now() + self.duration;
        let shared = Arc::clone(&self.slot);

        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;

            let fired = {
                let mut slot = lock(&shared);
                if slot.armed.as_ref().is_some_and(|a| a.generation == generation) {
                    slot.armed = None;
                    slot.remaining_when_idle = Duration::ZERO;
                    true
                } else {
                    false
                }
            };

            if fired {
                debug!(generation, "countdown expired");
                if let Some(listener) = listener.upgrade() {
                    listener.on_timeout();
                }
            }
        });

        slot.armed = Some(Armed {
            generation,
            deadline,
            handle,
        });
        debug!(generation, seconds = self.duration.as_secs(), "countdown armed");
    }

    /// Disarms the timer. Cancelling a disarmed timer does nothing.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        if let Some(armed) = slot.armed.take() {
            armed.handle.abort();
            slot.remaining_when_idle = armed.deadline.saturating_duration_since(Instant::now());
            debug!(generation = armed.generation, "countdown cancelled");
        }
    }

    /// Returns `true` while a deadline is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        lock(&self.slot).armed.is_some()
    }

    /// Time left on the armed deadline, or the value frozen at the last
    /// cancel or expiry while disarmed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        let slot = lock(&self.slot);
        match &slot.armed {
            Some(armed) => armed.deadline.saturating_duration_since(Instant::now()),
            None => slot.remaining_when_idle,
        }
    }

    /// [`remaining`](Self::remaining) in whole seconds, rounded up.
    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        let remaining = self.remaining();
        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
