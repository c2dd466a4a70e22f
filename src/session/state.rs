/// Lifecycle states of a search session
///
/// A session is created, runs once, and ends in exactly one terminal state.
use crate::search::SearchOutcome;
use serde::Serialize;
use std::fmt;

/// Represents the current state of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    // ===== Active States =====
    /// Session is registered but its worker has not started yet
    Created,

    /// Worker is executing the search
    Running,

    // ===== Terminal States =====
    /// A path was found
    Completed,

    /// The frontier emptied without reaching the finish page
    Exhausted,

    /// Cancellation or the wall-clock deadline stopped the search
    Aborted,

    /// The search failed unexpectedly
    Errored,
}

impl SessionState {
    /// Returns true if this is a terminal state
    ///
    /// Terminal states are final; a session never re-enters `Running`.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the session may still produce a result
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Created | Self::Running)
    }

    /// Returns true if moving from this state to `next` is allowed
    ///
    /// `Created` may go straight to a terminal state when a session is
    /// aborted or fails before its worker gets to run.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        match self {
            Self::Created => next != Self::Created,
            Self::Running => next.is_terminal(),
            _ => false,
        }
    }

    /// Wire name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Exhausted => "exhausted",
            Self::Aborted => "aborted",
            Self::Errored => "errored",
        }
    }
}

impl From<SearchOutcome> for SessionState {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Found => Self::Completed,
            SearchOutcome::Exhausted => Self::Exhausted,
            SearchOutcome::Cancelled | SearchOutcome::TimedOut => Self::Aborted,
            SearchOutcome::Failed => Self::Errored,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
