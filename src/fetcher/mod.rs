//! Page fetching for the lazily materialized link graph
//!
//! This module turns a page identifier into its outbound article links:
//! - HTTP fetching with failure classification (`client`)
//! - HTML parsing, link canonicalization and namespace filtering (`parser`)
//! - Inbound links via the MediaWiki API (`backlinks`)
//! - Process-wide time-bounded caches of link sets and page text (`cache`)
//!
//! Search strategies only see the `LinkSource` trait, so they can run against
//! the network-backed `PageFetcher` or an in-memory graph alike.

mod backlinks;
mod cache;
mod client;
mod parser;

pub use backlinks::{article_title, page_for_title};
pub use cache::{CachedEntry, LinkCache, PageCache, TextCache};
pub use client::{
    build_http_client, fetch_document, format_user_agent, FetchFailure, FetchedDocument,
};
pub use parser::{parse_article, ParsedArticle};

use crate::config::Config;
use crate::events::EventLog;
use crate::page::{ArticlePattern, Page};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The outbound article links of one page
///
/// `total_count` includes links that were filtered out (non-articles,
/// fragments, other namespaces), so it is always >= `valid_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSet {
    links: Arc<[Page]>,
    total_links: usize,
}

impl LinkSet {
    /// Creates a link set; `total_links` is raised to at least `links.len()`
    pub fn new(links: Vec<Page>, total_links: usize) -> Self {
        let total_links = total_links.max(links.len());
        Self {
            links: links.into(),
            total_links,
        }
    }

    /// A link set with no links, used for dead ends and failed fetches
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// The qualifying links, in document order
    pub fn pages(&self) -> &[Page] {
        &self.links
    }

    /// Number of qualifying links
    pub fn valid_count(&self) -> usize {
        self.links.len()
    }

    /// Number of links seen before filtering
    pub fn total_count(&self) -> usize {
        self.total_links
    }

    /// Returns true if there are no qualifying links
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Something that can list the edges of the link graph around a page
///
/// Implementations never fail: an unreachable page is an empty `LinkSet`.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Returns the outbound article links of `page`
    async fn links(&self, page: &Page) -> LinkSet;

    /// Returns the articles that link to `page`
    async fn backlinks(&self, page: &Page) -> LinkSet;
}

/// Something that can provide the body text of a page
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Returns the body text of `page`, or `None` if it cannot be fetched
    async fn text(&self, page: &Page) -> Option<String>;
}

/// Network-backed page fetcher with a shared link cache
///
/// One instance is shared by every session of a registry. Each network fetch
/// emits its valid and total link counts to the diagnostic log and fills both
/// the link cache and the text cache, so a page is downloaded at most once
/// per time-to-live whichever of the two is asked for first.
pub struct PageFetcher {
    client: Client,
    pattern: ArticlePattern,
    cache: LinkCache,
    backlink_cache: LinkCache,
    text_cache: TextCache,
    backlinks_api: Option<String>,
    events: EventLog,
    network_fetches: AtomicU64,
}

impl PageFetcher {
    /// Creates a fetcher from its parts
    pub fn new(
        client: Client,
        pattern: ArticlePattern,
        cache_ttl: chrono::Duration,
        events: EventLog,
    ) -> Self {
        Self {
            client,
            pattern,
            cache: LinkCache::new(cache_ttl),
            backlink_cache: LinkCache::new(cache_ttl),
            text_cache: TextCache::new(cache_ttl),
            backlinks_api: None,
            events,
            network_fetches: AtomicU64::new(0),
        }
    }

    /// Enables inbound link lookups through a MediaWiki API endpoint
    pub fn with_backlinks_api(mut self, api: impl Into<String>) -> Self {
        self.backlinks_api = Some(api.into());
        self
    }

    /// Creates a fetcher from the `[user-agent]` and `[fetcher]` sections
    pub fn from_config(config: &Config, events: EventLog) -> crate::Result<Self> {
        let client = build_http_client(&config.user_agent, &config.fetcher)?;
        let pattern = ArticlePattern::new(&config.fetcher.article_pattern)?;
        let ttl_secs = config.fetcher.cache_ttl_secs.min(u64::from(u32::MAX)) as i64;

        let fetcher = Self::new(
            client,
            pattern,
            chrono::Duration::seconds(ttl_secs),
            events,
        );

        Ok(match &config.fetcher.backlinks_api {
            Some(api) => fetcher.with_backlinks_api(api.clone()),
            None => fetcher,
        })
    }

    /// The shared link cache
    pub fn cache(&self) -> &LinkCache {
        &self.cache
    }

    /// The shared page text cache
    pub fn text_cache(&self) -> &TextCache {
        &self.text_cache
    }

    /// Drops stale entries from every cache, returning how many were removed
    pub fn purge_stale(&self) -> usize {
        self.cache.purge_stale()
            + self.backlink_cache.purge_stale()
            + self.text_cache.purge_stale()
    }

    /// The article namespace filter in use
    pub fn pattern(&self) -> &ArticlePattern {
        &self.pattern
    }

    /// Number of HTTP requests issued so far
    pub fn network_fetches(&self) -> u64 {
        self.network_fetches.load(Ordering::Relaxed)
    }

    /// Fetches and parses a page, refreshing its cache entry on success
    async fn fetch_article(&self, page: &Page) -> Result<ParsedArticle, FetchFailure> {
        self.network_fetches.fetch_add(1, Ordering::Relaxed);

        let document = match fetch_document(&self.client, page.as_str()).await {
            Ok(document) => document,
            Err(failure) => {
                tracing::warn!(page = %page, kind = failure.kind(), "Fetch failed: {}", failure);
                self.events.emit(format!(
                    "Failed to retrieve page: {} with error [{}]: {}",
                    page,
                    failure.kind(),
                    failure
                ));
                return Err(failure);
            }
        };

        let parsed = parse_article(&document.body, &document.final_url, &self.pattern);

        tracing::debug!(
            page = %page,
            valid = parsed.links.len(),
            total = parsed.total_links,
            "Fetched page"
        );
        self.events.emit(format!(
            "Found {} valid links on page: {}",
            parsed.links.len(),
            page
        ));
        self.events.emit(format!(
            "Found {} total links on page: {}",
            parsed.total_links, page
        ));

        self.cache.insert(
            page.clone(),
            LinkSet::new(parsed.links.clone(), parsed.total_links),
        );
        self.text_cache.insert(page.clone(), parsed.text.clone());

        Ok(parsed)
    }

    /// Looks up inbound links, returning an empty set without an API
    async fn fetch_backlinks(&self, page: &Page) -> LinkSet {
        let Some(api) = &self.backlinks_api else {
            return LinkSet::empty();
        };
        let (Some(title), Ok(sibling)) = (article_title(page), page.to_url()) else {
            return LinkSet::empty();
        };

        self.network_fetches.fetch_add(1, Ordering::Relaxed);

        let titles = match backlinks::fetch_backlink_titles(&self.client, api, &title).await {
            Ok(titles) => titles,
            Err(failure) => {
                tracing::warn!(page = %page, kind = failure.kind(), "Backlink lookup failed: {}", failure);
                self.events.emit(format!(
                    "Failed to retrieve backlinks: {} with error [{}]: {}",
                    page,
                    failure.kind(),
                    failure
                ));
                return LinkSet::empty();
            }
        };

        let total = titles.len();
        let mut seen = std::collections::HashSet::new();
        let pages: Vec<Page> = titles
            .iter()
            .filter_map(|title| page_for_title(title, &sibling, &self.pattern))
            .filter(|linking| seen.insert(linking.clone()))
            .collect();

        tracing::debug!(page = %page, valid = pages.len(), total, "Fetched backlinks");
        self.events.emit(format!(
            "Found {} backlinks to page: {}",
            pages.len(),
            page
        ));

        let set = LinkSet::new(pages, total);
        self.backlink_cache.insert(page.clone(), set.clone());
        set
    }
}

#[async_trait]
impl LinkSource for PageFetcher {
    async fn links(&self, page: &Page) -> LinkSet {
        if let Some(cached) = self.cache.get(page) {
            tracing::trace!(page = %page, "Link cache hit");
            return cached;
        }

        match self.fetch_article(page).await {
            Ok(parsed) => LinkSet::new(parsed.links, parsed.total_links),
            Err(_) => LinkSet::empty(),
        }
    }

    async fn backlinks(&self, page: &Page) -> LinkSet {
        if let Some(cached) = self.backlink_cache.get(page) {
            tracing::trace!(page = %page, "Backlink cache hit");
            return cached;
        }

        self.fetch_backlinks(page).await
    }
}

#[async_trait]
impl TextSource for PageFetcher {
    async fn text(&self, page: &Page) -> Option<String> {
        if let Some(cached) = self.text_cache.get(page) {
            tracing::trace!(page = %page, "Text cache hit");
            return Some(cached);
        }

        self.fetch_article(page).await.ok().map(|parsed| parsed.text)
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("pattern", &self.pattern.as_str())
            .field("cached", &self.cache.len())
            .field("cached_text", &self.text_cache.len())
            .field("network_fetches", &self.network_fetches())
            .finish()
    }
}
