//! Wiki-Race: a path finder for hyperlinked corpora
//!
//! This crate discovers a chain of article links between a start page and a
//! finish page. The link graph is never stored up front; it is materialized
//! page by page through a caching HTTP fetcher while one of three search
//! strategies (breadth-first, bidirectional, best-first) walks it. Searches
//! run as independent sessions that can be polled and aborted.

pub mod config;
pub mod events;
pub mod fetcher;
pub mod heuristic;
pub mod page;
pub mod search;
pub mod server;
pub mod session;

use thiserror::Error;

/// Main error type for Wiki-Race operations
#[derive(Debug, Error)]
pub enum WikiRaceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid article pattern: {0}")]
    InvalidPattern(String),
}

/// Page identifier errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("URL is outside the article namespace: {0}")]
    OutsideNamespace(String),
}

/// Errors that end a search request or a search session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown search method: {0}")]
    UnknownStrategy(String),

    #[error("Heuristic target profile was not precomputed")]
    HeuristicNotReady,

    #[error("Search worker failed: {0}")]
    Panicked(String),
}

/// Result type alias for Wiki-Race operations
pub type Result<T> = std::result::Result<T, WikiRaceError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page operations
pub type PageResult<T> = std::result::Result<T, PageError>;

// Re-export commonly used types
pub use config::Config;
pub use events::EventLog;
pub use fetcher::{LinkSet, LinkSource, PageFetcher, TextSource};
pub use heuristic::{ContentHeuristic, Heuristic, ZeroHeuristic};
pub use page::{ArticlePattern, Page};
pub use search::{SearchControl, SearchOutcome, SearchResult, Strategy};
pub use session::{PollResult, SearchRequest, SessionRegistry, SessionState};
