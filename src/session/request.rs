//! Validated search requests

use crate::page::{ArticlePattern, Page};
use crate::search::Strategy;
use crate::SearchError;
use serde::Deserialize;

/// Untrusted request fields, as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchRequest {
    #[serde(default)]
    pub start: Option<String>,

    #[serde(default)]
    pub finish: Option<String>,

    #[serde(default)]
    pub method: Option<String>,
}

/// An immutable, validated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    start: Page,
    finish: Page,
    strategy: Strategy,
}

impl SearchRequest {
    /// Creates a request from already canonical pages
    pub fn new(start: Page, finish: Page, strategy: Strategy) -> Self {
        Self {
            start,
            finish,
            strategy,
        }
    }

    /// Validates raw request fields
    ///
    /// Start and finish must be present, parse as URLs and lie inside the
    /// article namespace. A missing method means breadth-first search.
    pub fn validate(raw: &RawSearchRequest, pattern: &ArticlePattern) -> Result<Self, SearchError> {
        let (Some(start), Some(finish)) = (non_empty(&raw.start), non_empty(&raw.finish)) else {
            return Err(SearchError::InvalidRequest(
                "Missing \"start\" or \"finish\" parameters".to_string(),
            ));
        };

        let strategy = match non_empty(&raw.method) {
            Some(method) => method.parse()?,
            None => Strategy::default(),
        };

        Ok(Self::new(
            article(start, pattern)?,
            article(finish, pattern)?,
            strategy,
        ))
    }

    pub fn start(&self) -> &Page {
        &self.start
    }

    pub fn finish(&self) -> &Page {
        &self.finish
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn article(raw: &str, pattern: &ArticlePattern) -> Result<Page, SearchError> {
    let page = Page::parse(raw)
        .map_err(|e| SearchError::InvalidRequest(format!("{}: {}", raw, e)))?;
    if !pattern.matches(page.as_str()) {
        return Err(SearchError::InvalidRequest(format!(
            "{} is not an article page",
            page
        )));
    }
    Ok(page)
}
