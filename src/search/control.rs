//! Cooperative stop signals for a running search
//!
//! Strategies poll `SearchControl::check` at the top of every expansion step.
//! Nothing is interrupted mid-fetch, so a stop takes effect within one fetch
//! round-trip plus one expansion.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Why a search stopped before reaching a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The session's cancellation token fired
    Cancelled,

    /// The session's wall-clock deadline passed
    TimedOut,
}

/// Cancellation token plus optional hard deadline of one session
#[derive(Debug, Clone, Default)]
pub struct SearchControl {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl SearchControl {
    /// Creates a control driven by `token`, with no deadline
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Sets the deadline to `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Sets an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns the reason to stop, if any; cancellation wins over timeout
    pub fn check(&self) -> Option<StopReason> {
        if self.token.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::TimedOut),
            _ => None,
        }
    }
}
