//! Diagnostic log stream
//!
//! Search milestones and per-fetch statistics are published as human-readable
//! lines. Subscribers (the `/logs` SSE endpoint) receive a snapshot of the
//! recent backlog followed by live events, in emission order. Every line is
//! mirrored to `tracing` at debug level.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// One diagnostic line
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    /// Monotonic sequence number, starting at 0
    pub seq: u64,

    /// When the line was emitted
    pub at: DateTime<Utc>,

    /// The line itself
    pub message: String,
}

struct Backlog {
    events: VecDeque<LogEvent>,
    next_seq: u64,
}

/// Shared handle to the diagnostic log stream
#[derive(Clone)]
pub struct EventLog {
    tx: broadcast::Sender<LogEvent>,
    backlog: Arc<Mutex<Backlog>>,
    capacity: usize,
}

impl EventLog {
    /// Creates a log that keeps at most `capacity` recent lines
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            backlog: Arc::new(Mutex::new(Backlog {
                events: VecDeque::with_capacity(capacity),
                next_seq: 0,
            })),
            capacity,
        }
    }

    /// Publishes a line to every subscriber and to the backlog
    pub fn emit(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(target: "wiki_race::events", "{}", message);

        // The lock spans the send so sequence order equals delivery order.
        let mut backlog = match self.backlog.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let event = LogEvent {
            seq: backlog.next_seq,
            at: Utc::now(),
            message,
        };
        backlog.next_seq += 1;

        if backlog.events.len() == self.capacity {
            backlog.events.pop_front();
        }
        backlog.events.push_back(event.clone());

        // No receivers is fine; the backlog still has the line.
        let _ = self.tx.send(event);
    }

    /// Returns the current backlog and a receiver for everything after it
    pub fn subscribe(&self) -> (Vec<LogEvent>, broadcast::Receiver<LogEvent>) {
        let backlog = match self.backlog.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let rx = self.tx.subscribe();
        (backlog.events.iter().cloned().collect(), rx)
    }

    /// Drops the backlog; live subscribers are unaffected
    pub fn clear(&self) {
        let mut backlog = match self.backlog.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        backlog.events.clear();
    }

    /// Number of lines currently in the backlog
    pub fn backlog_len(&self) -> usize {
        match self.backlog.lock() {
            Ok(guard) => guard.events.len(),
            Err(poisoned) => poisoned.into_inner().events.len(),
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("capacity", &self.capacity)
            .field("backlog", &self.backlog_len())
            .finish()
    }
}
