//! Trailing-edge debounce deadline.

use std::time::Duration;

use tokio::time::Instant;

/// A restartable deadline. Each [`restart`](Self::restart) pushes the
/// deadline a full window past now; only the last input in a burst fires.
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn restart(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Clears and reports the deadline if it has passed at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
