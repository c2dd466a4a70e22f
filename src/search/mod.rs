//! Traversal strategies over the lazily fetched link graph
//!
//! Every strategy runs against a `LinkSource`, owns its frontier and
//! discovered set for the duration of one call, and returns the same
//! `SearchResult` shape. Cancellation and the wall-clock deadline are checked
//! at the top of every expansion step through `SearchControl`; an in-flight
//! fetch is never interrupted.

mod best_first;
mod bfs;
mod bidirectional;
mod control;
mod frontier;
mod path;
mod result;

pub use control::{SearchControl, StopReason};
pub use result::{SearchOutcome, SearchReport, SearchResult, Strategy};

use crate::events::EventLog;
use crate::fetcher::LinkSource;
use crate::heuristic::Heuristic;
use crate::page::Page;
use crate::SearchError;
use std::time::{Duration, Instant};

/// Runs search strategies for one session
///
/// The engine borrows everything it needs; it holds no state between calls.
pub struct SearchEngine<'a> {
    source: &'a dyn LinkSource,
    control: &'a SearchControl,
    events: &'a EventLog,
    label: String,
}

impl<'a> SearchEngine<'a> {
    /// Creates an engine over `source`
    ///
    /// # Arguments
    ///
    /// * `source` - Where page links come from
    /// * `control` - Cancellation token and deadline for this search
    /// * `events` - Diagnostic log receiving milestone lines
    pub fn new(source: &'a dyn LinkSource, control: &'a SearchControl, events: &'a EventLog) -> Self {
        Self {
            source,
            control,
            events,
            label: String::from("(local)"),
        }
    }

    /// Sets the identifier used in milestone log lines
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Runs `strategy`; `heuristic` is only consulted by best-first search
    pub async fn run(
        &self,
        strategy: Strategy,
        start: &Page,
        finish: &Page,
        heuristic: &dyn Heuristic,
    ) -> Result<SearchResult, SearchError> {
        tracing::info!(
            search_id = %self.label,
            strategy = %strategy,
            start = %start,
            finish = %finish,
            "Starting search"
        );

        let result = match strategy {
            Strategy::BreadthFirst => self.breadth_first(start, finish).await,
            Strategy::Bidirectional => self.bidirectional(start, finish).await,
            Strategy::BestFirst => self.best_first(start, finish, heuristic).await?,
        };

        tracing::info!(
            search_id = %self.label,
            outcome = ?result.outcome,
            discovered = result.discovered,
            total_links = result.total_links,
            path_length = result.path_length(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Search finished"
        );

        Ok(result)
    }

    /// Checks the control, logging the reason when the search must stop
    fn should_stop(&self) -> Option<StopReason> {
        let reason = self.control.check()?;
        match reason {
            StopReason::Cancelled => self
                .events
                .emit(format!("Search {} aborted by user request.", self.label)),
            StopReason::TimedOut => self
                .events
                .emit(format!("Search {} timed out.", self.label)),
        }
        Some(reason)
    }

    fn emit(&self, message: String) {
        self.events.emit(message);
    }

    fn log_found(&self, path: &[Page]) {
        self.emit(format!(
            "Search {} completed. Path found: {}",
            self.label,
            format_path(path)
        ));
    }

    fn log_exhausted(&self) {
        self.emit(format!(
            "Search {} concluded without finding a path.",
            self.label
        ));
    }

    fn log_trivial(&self) {
        self.emit(format!(
            "Start and finish pages are the same for search_id: {}",
            self.label
        ));
    }
}

/// Accumulates the statistics every strategy reports
pub(crate) struct Tally {
    strategy: Strategy,
    started: Instant,
    total_links: usize,
}

impl Tally {
    pub(crate) fn start(strategy: Strategy) -> Self {
        Self {
            strategy,
            started: Instant::now(),
            total_links: 0,
        }
    }

    pub(crate) fn add_links(&mut self, total: usize) {
        self.total_links += total;
    }

    /// Result for start == finish
    pub(crate) fn trivial(self, page: &Page) -> SearchResult {
        SearchResult {
            path: Some(vec![page.clone()]),
            elapsed: Duration::ZERO,
            discovered: 1,
            total_links: 0,
            strategy: self.strategy,
            outcome: SearchOutcome::Found,
            error: None,
        }
    }

    pub(crate) fn found(self, path: Vec<Page>, discovered: usize) -> SearchResult {
        self.finish(Some(path), discovered, SearchOutcome::Found)
    }

    pub(crate) fn exhausted(self, discovered: usize) -> SearchResult {
        self.finish(None, discovered, SearchOutcome::Exhausted)
    }

    pub(crate) fn stopped(self, reason: StopReason, discovered: usize) -> SearchResult {
        self.finish(None, discovered, reason.into())
    }

    fn finish(self, path: Option<Vec<Page>>, discovered: usize, outcome: SearchOutcome) -> SearchResult {
        SearchResult {
            path,
            elapsed: self.started.elapsed(),
            discovered,
            total_links: self.total_links,
            strategy: self.strategy,
            outcome,
            error: None,
        }
    }
}

fn format_path(path: &[Page]) -> String {
    path.iter()
        .map(Page::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
