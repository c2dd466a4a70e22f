//! The fixed result shape shared by every strategy

use crate::page::Page;
use crate::search::control::StopReason;
use crate::SearchError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Traversal strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Single-directed breadth-first search; shortest paths
    #[default]
    BreadthFirst,

    /// Breadth-first from both ends, meeting in the middle
    Bidirectional,

    /// Best-first (A*-style) guided by a heuristic; best-effort paths
    BestFirst,
}

impl Strategy {
    /// All strategies
    pub const ALL: [Strategy; 3] = [Self::BreadthFirst, Self::Bidirectional, Self::BestFirst];

    /// The wire name of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BreadthFirst => "breadth-first",
            Self::Bidirectional => "bidirectional",
            Self::BestFirst => "best-first",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SearchError;

    /// Accepts the wire names plus the historical `a_star` spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breadth-first" | "breadth_first" | "bfs" => Ok(Self::BreadthFirst),
            "bidirectional" => Ok(Self::Bidirectional),
            "best-first" | "best_first" | "a_star" | "a-star" | "astar" => Ok(Self::BestFirst),
            _ => Err(SearchError::UnknownStrategy(s.to_string())),
        }
    }
}

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A path was found
    Found,

    /// The frontier emptied without reaching the finish page
    Exhausted,

    /// Cancellation was observed
    Cancelled,

    /// The wall-clock deadline passed
    TimedOut,

    /// The strategy failed; see `SearchResult::error`
    Failed,
}

impl From<StopReason> for SearchOutcome {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::Cancelled => Self::Cancelled,
            StopReason::TimedOut => Self::TimedOut,
        }
    }
}

/// Result of one search, identical in shape for every strategy
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Pages from start to finish, inclusive
    pub path: Option<Vec<Page>>,

    /// Time spent searching
    pub elapsed: Duration,

    /// Pages discovered (enqueued or finalized) by the strategy
    pub discovered: usize,

    /// Links seen on expanded pages, including filtered ones
    pub total_links: usize,

    /// Strategy that produced the result
    pub strategy: Strategy,

    /// How the search ended
    pub outcome: SearchOutcome,

    /// Failure description for `SearchOutcome::Failed`
    pub error: Option<String>,
}

impl SearchResult {
    /// Result for a strategy that failed before or while running
    pub fn failed(strategy: Strategy, elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            path: None,
            elapsed,
            discovered: 0,
            total_links: 0,
            strategy,
            outcome: SearchOutcome::Failed,
            error: Some(error.into()),
        }
    }

    /// Number of pages on the path, 0 when there is none
    pub fn path_length(&self) -> usize {
        self.path.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if a path was found
    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }

    /// The serializable view returned to clients
    pub fn report(&self) -> SearchReport<'_> {
        SearchReport {
            path: self.path.as_deref(),
            time: self.elapsed.as_secs_f64(),
            discovered: self.discovered,
            total_links: self.total_links,
            completed: self.is_found(),
            error: self.error.as_deref(),
            search_method: self.strategy,
            path_length: self.path_length(),
            outcome: self.outcome,
        }
    }
}

/// Wire form of a `SearchResult`
#[derive(Debug, Serialize)]
pub struct SearchReport<'a> {
    pub path: Option<&'a [Page]>,
    pub time: f64,
    pub discovered: usize,
    pub total_links: usize,
    pub completed: bool,
    pub error: Option<&'a str>,
    pub search_method: Strategy,
    pub path_length: usize,
    pub outcome: SearchOutcome,
}
