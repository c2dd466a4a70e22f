//! Per-page caching
//!
//! Link sets and page text are cached per canonical page with a time-to-live.
//! The corpus is assumed quasi-static, so entries are never invalidated early.
//! Concurrent fetches of the same page may both insert; the last writer wins.
//! Stale entries are skipped on lookup and dropped by `purge_stale`.

use crate::fetcher::LinkSet;
use crate::page::Page;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// A cached value together with the time it was fetched
#[derive(Debug, Clone)]
pub struct CachedEntry<V> {
    /// The cached value
    pub value: V,

    /// When the value was fetched
    pub fetched_at: DateTime<Utc>,
}

impl<V> CachedEntry<V> {
    /// Creates a new entry stamped with the current time
    pub fn new(value: V) -> Self {
        Self {
            value,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the entry is older than `ttl`
    pub fn is_stale(&self, ttl: Duration) -> bool {
        Utc::now() - self.fetched_at > ttl
    }
}

/// Process-wide cache keyed by canonical page
#[derive(Debug)]
pub struct PageCache<V> {
    entries: Mutex<HashMap<Page, CachedEntry<V>>>,
    ttl: Duration,
}

/// Outbound or inbound link sets
pub type LinkCache = PageCache<LinkSet>;

/// Paragraph text used for keyword profiles
pub type TextCache = PageCache<String>;

impl<V: Clone> PageCache<V> {
    /// Creates an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value for `page` if present and fresh
    pub fn get(&self, page: &Page) -> Option<V> {
        let entries = self.lock();
        entries
            .get(page)
            .filter(|entry| !entry.is_stale(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Stores the value for `page`, replacing any previous entry
    pub fn insert(&self, page: Page, value: V) {
        self.lock().insert(page, CachedEntry::new(value));
    }

    /// Drops every stale entry, returning how many were removed
    pub fn purge_stale(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(self.ttl));
        before - entries.len()
    }

    /// Number of entries, fresh or stale
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Page, CachedEntry<V>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[cfg(test)]
    pub(crate) fn backdate(&self, page: &Page, age: Duration) {
        if let Some(entry) = self.lock().get_mut(page) {
            entry.fetched_at = Utc::now() - age;
        }
    }
}
