//! Distance estimates for best-first search
//!
//! The content heuristic compares the keyword profile of a candidate page with
//! the profile of the target page. It is a guide only: topical similarity has
//! no proven relationship to hop distance, so it is neither admissible nor
//! consistent and best-first search using it does not certify shortest paths.

mod keywords;

pub use keywords::TermProfile;

use crate::fetcher::TextSource;
use crate::page::Page;
use crate::SearchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A distance estimate from a page to the search target
#[async_trait]
pub trait Heuristic: Send + Sync {
    /// Returns a distance in [0, 1]; 0 means "looks like the target"
    async fn estimate(&self, page: &Page) -> Result<f64, SearchError>;
}

/// Heuristic that is identically zero
///
/// Best-first search with this heuristic orders purely by hop count and so
/// behaves like breadth-first search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

#[async_trait]
impl Heuristic for ZeroHeuristic {
    async fn estimate(&self, _page: &Page) -> Result<f64, SearchError> {
        Ok(0.0)
    }
}

/// Keyword-overlap heuristic against a precomputed target profile
///
/// Candidate profiles are memoized for the lifetime of the heuristic, which is
/// one session. A page whose text cannot be fetched gets an empty profile and
/// therefore the maximal distance of 1.
pub struct ContentHeuristic {
    source: Arc<dyn TextSource>,
    target: Option<TermProfile>,
    profiles: Mutex<HashMap<Page, Arc<TermProfile>>>,
}

impl ContentHeuristic {
    /// Creates a heuristic with no target yet
    pub fn new(source: Arc<dyn TextSource>) -> Self {
        Self {
            source,
            target: None,
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Builds and stores the target profile
    ///
    /// Returns the number of distinct terms in the profile; 0 means every
    /// estimate will be 1.
    pub async fn precompute(&mut self, target: &Page) -> usize {
        let profile = self.profile(target).await;
        let terms = profile.len();
        if terms == 0 {
            tracing::warn!(page = %target, "Target page has an empty keyword profile");
        }
        self.target = Some(profile.as_ref().clone());
        terms
    }

    /// Returns true once `precompute` has run
    pub fn is_ready(&self) -> bool {
        self.target.is_some()
    }

    async fn profile(&self, page: &Page) -> Arc<TermProfile> {
        if let Some(profile) = self.lock_profiles().get(page) {
            return Arc::clone(profile);
        }

        let profile = match self.source.text(page).await {
            Some(text) => Arc::new(TermProfile::from_text(&text)),
            None => Arc::new(TermProfile::default()),
        };

        self.lock_profiles()
            .insert(page.clone(), Arc::clone(&profile));
        profile
    }

    fn lock_profiles(&self) -> std::sync::MutexGuard<'_, HashMap<Page, Arc<TermProfile>>> {
        match self.profiles.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl Heuristic for ContentHeuristic {
    async fn estimate(&self, page: &Page) -> Result<f64, SearchError> {
        let target = self.target.as_ref().ok_or(SearchError::HeuristicNotReady)?;
        let candidate = self.profile(page).await;
        Ok(1.0 - candidate.overlap(target))
    }
}

impl std::fmt::Debug for ContentHeuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentHeuristic")
            .field("target_terms", &self.target.as_ref().map(TermProfile::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticText {
        texts: HashMap<Page, String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextSource for StaticText {
        async fn text(&self, page: &Page) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts.get(page).cloned()
        }
    }

    fn page(title: &str) -> Page {
        Page::parse(&format!("https://en.wikipedia.org/wiki/{}", title)).unwrap()
    }

    fn source() -> Arc<StaticText> {
        let mut texts = HashMap::new();
        texts.insert(page("Oak"), "oak oak tree tree acorn acorn".to_string());
        texts.insert(page("Maple"), "maple maple tree tree leaf leaf".to_string());
        texts.insert(page("Engine"), "engine engine piston piston".to_string());
        Arc::new(StaticText {
            texts,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_estimate_before_precompute_fails() {
        let heuristic = ContentHeuristic::new(source());
        assert!(!heuristic.is_ready());
        assert_eq!(
            heuristic.estimate(&page("Oak")).await,
            Err(SearchError::HeuristicNotReady)
        );
    }

    #[tokio::test]
    async fn test_target_has_zero_distance() {
        let mut heuristic = ContentHeuristic::new(source());
        assert_eq!(heuristic.precompute(&page("Oak")).await, 3);
        assert_eq!(heuristic.estimate(&page("Oak")).await, Ok(0.0));
    }

    #[tokio::test]
    async fn test_related_page_is_closer_than_unrelated() {
        let mut heuristic = ContentHeuristic::new(source());
        heuristic.precompute(&page("Oak")).await;

        let maple = heuristic.estimate(&page("Maple")).await.unwrap();
        let engine = heuristic.estimate(&page("Engine")).await.unwrap();
        assert!(maple < engine);
        assert_eq!(engine, 1.0);
        assert!((0.0..=1.0).contains(&maple));
    }

    #[tokio::test]
    async fn test_unfetchable_page_is_maximally_distant() {
        let mut heuristic = ContentHeuristic::new(source());
        heuristic.precompute(&page("Oak")).await;
        assert_eq!(heuristic.estimate(&page("Missing")).await, Ok(1.0));
    }

    #[tokio::test]
    async fn test_profiles_are_memoized() {
        let text = source();
        let mut heuristic = ContentHeuristic::new(text.clone());
        heuristic.precompute(&page("Oak")).await;

        heuristic.estimate(&page("Maple")).await.unwrap();
        heuristic.estimate(&page("Maple")).await.unwrap();
        heuristic.estimate(&page("Oak")).await.unwrap();

        // Oak once (precompute), Maple once
        assert_eq!(text.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_heuristic() {
        assert_eq!(ZeroHeuristic.estimate(&page("Anything")).await, Ok(0.0));
    }
}
