use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Article pattern for the English Wikipedia main namespace
pub const DEFAULT_ARTICLE_PATTERN: &str = r"^https://en\.wikipedia\.org/wiki/[^:]*$";

/// MediaWiki API of the English Wikipedia
pub const DEFAULT_BACKLINKS_API: &str = "https://en.wikipedia.org/w/api.php";

/// Main configuration structure for Wiki-Race
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub fetcher: FetcherConfig,
    pub search: SearchConfig,
}

/// HTTP surface configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind: SocketAddr,

    /// Directory holding the web client, served at `/`
    #[serde(rename = "static-dir")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5001)),
            static_dir: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "WikiRace".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/wiki-race".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

/// Page fetching configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// How long a fetched link set stays valid in the cache (seconds)
    #[serde(rename = "cache-ttl-secs")]
    pub cache_ttl_secs: u64,

    /// Regex an absolute, fragment-free link must match to count as an article
    #[serde(rename = "article-pattern")]
    pub article_pattern: String,

    /// MediaWiki API endpoint used to list inbound links (`list=backlinks`)
    ///
    /// Without it the backward half of a bidirectional search has no edges
    /// and the search degrades to a forward breadth-first walk.
    #[serde(rename = "backlinks-api")]
    pub backlinks_api: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            cache_ttl_secs: 3600,
            article_pattern: DEFAULT_ARTICLE_PATTERN.to_string(),
            backlinks_api: Some(DEFAULT_BACKLINKS_API.to_string()),
        }
    }
}

/// Search session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Hard wall-clock deadline for a single session (seconds)
    #[serde(rename = "max-duration-secs")]
    pub max_duration_secs: u64,

    /// How long an unread terminal result is retained (seconds)
    #[serde(rename = "retention-secs")]
    pub retention_secs: u64,

    /// Capacity of the diagnostic log backlog and broadcast channel
    #[serde(rename = "log-capacity")]
    pub log_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 600,
            retention_secs: 900,
            log_capacity: 1024,
        }
    }
}
