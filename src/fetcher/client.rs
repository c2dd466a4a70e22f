//! HTTP client for article pages
//!
//! This module handles the network side of page fetching:
//! - Building HTTP clients with a proper user agent string
//! - GET requests for page bodies
//! - Classifying failures so they can be logged and treated as dead ends

use crate::config::{FetcherConfig, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

/// A successfully fetched HTML document
#[derive(Debug)]
pub struct FetchedDocument {
    /// Final URL after redirects, used as the base for relative links
    pub final_url: Url,

    /// Page body content
    pub body: String,
}

/// Why a page could not be fetched
///
/// None of these abort a search; the page is treated as having no links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Non-success HTTP status
    Status { status_code: u16 },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch { content_type: String },

    /// Request or body read timed out
    Timeout,

    /// Connection refused, DNS failure, TLS error
    Connect { error: String },

    /// Any other transport or decoding error
    Network { error: String },
}

impl FetchFailure {
    /// Short machine-friendly name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { status_code } if *status_code == StatusCode::NOT_FOUND.as_u16() => {
                "DeadLink"
            }
            Self::Status { status_code }
                if *status_code == StatusCode::TOO_MANY_REQUESTS.as_u16() =>
            {
                "RateLimited"
            }
            Self::Status { .. } => "HttpError",
            Self::ContentMismatch { .. } => "ContentMismatch",
            Self::Timeout => "Timeout",
            Self::Connect { .. } => "ConnectionError",
            Self::Network { .. } => "NetworkError",
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status_code } => write!(f, "HTTP status {}", status_code),
            Self::ContentMismatch { content_type } => {
                write!(f, "expected HTML, got '{}'", content_type)
            }
            Self::Timeout => write!(f, "request timeout"),
            Self::Connect { error } => write!(f, "connection failed: {}", error),
            Self::Network { error } => write!(f, "{}", error),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use wiki_race::config::{FetcherConfig, UserAgentConfig};
/// use wiki_race::fetcher::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    config: &FetcherConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format_user_agent(user_agent))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: CrawlerName/Version (+ContactURL; ContactEmail)
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Fetches a page body
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with `text/html` | `Ok(FetchedDocument)` |
/// | 2xx with another type | `ContentMismatch` |
/// | Any other status | `Status` |
/// | Timeout | `Timeout` |
/// | Connection refused, TLS error | `Connect` |
/// | Anything else | `Network` |
pub async fn fetch_document(client: &Client, url: &str) -> Result<FetchedDocument, FetchFailure> {
    let response = client.get(url).send().await.map_err(classify_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status {
            status_code: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // A missing header is tolerated; an explicit non-HTML type is not
    if !content_type.is_empty() && !content_type.contains("text/html") {
        return Err(FetchFailure::ContentMismatch { content_type });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(classify_error)?;

    Ok(FetchedDocument { final_url, body })
}

fn classify_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_connect() {
        FetchFailure::Connect {
            error: e.to_string(),
        }
    } else {
        FetchFailure::Network {
            error: e.to_string(),
        }
    }
}
