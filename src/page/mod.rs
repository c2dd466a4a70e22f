//! Page identifiers for the lazily discovered link graph
//!
//! This module provides the canonical `Page` identity, URL canonicalization,
//! and the article-namespace filter applied to discovered links.

mod matcher;
mod normalize;

use serde::Serialize;
use std::fmt;
use url::Url;

pub use matcher::ArticlePattern;
pub use normalize::canonicalize;
pub(crate) use normalize::encode_segment;

use crate::{PageError, PageResult};

/// A canonical, addressable node of the link graph
///
/// Equality is exact string equality of the canonical URL, so two pages
/// compare equal iff they canonicalize to the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Page(String);

impl Page {
    /// Canonicalizes an absolute URL into a page
    ///
    /// No namespace check is applied; this is used for caller-supplied
    /// start and finish pages.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiki_race::Page;
    ///
    /// let page = Page::parse("https://en.wikipedia.org/wiki/Tree#Uses").unwrap();
    /// assert_eq!(page.as_str(), "https://en.wikipedia.org/wiki/Tree");
    /// ```
    pub fn parse(raw: &str) -> PageResult<Self> {
        canonicalize(raw, None).map(Self::from)
    }

    /// Resolves a link found on `base` and keeps it only if it is an article
    ///
    /// Returns `Err(PageError::OutsideNamespace)` for links that parse but
    /// fall outside the article namespace.
    pub fn from_link(href: &str, base: &Url, pattern: &ArticlePattern) -> PageResult<Self> {
        let url = canonicalize(href, Some(base))?;
        if !pattern.matches(url.as_str()) {
            return Err(PageError::OutsideNamespace(url.to_string()));
        }
        Ok(Self::from(url))
    }

    /// The canonical URL text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical URL, for resolving relative links found on this page
    pub fn to_url(&self) -> PageResult<Url> {
        Url::parse(&self.0).map_err(|e| PageError::Parse(e.to_string()))
    }
}

impl From<Url> for Page {
    fn from(url: Url) -> Self {
        Self(url.into())
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Page {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonicalizes() {
        let a = Page::parse("HTTPS://EN.WIKIPEDIA.ORG/wiki/Tree/").unwrap();
        let b = Page::parse("https://en.wikipedia.org/wiki/Tree#History").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_link_filters_namespace() {
        let base = Url::parse("https://en.wikipedia.org/wiki/Tree").unwrap();
        let pattern = ArticlePattern::default();

        let page = Page::from_link("/wiki/Leaf", &base, &pattern).unwrap();
        assert_eq!(page.as_str(), "https://en.wikipedia.org/wiki/Leaf");

        assert!(matches!(
            Page::from_link("/wiki/File:Leaf.jpg", &base, &pattern),
            Err(PageError::OutsideNamespace(_))
        ));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let page = Page::parse("https://en.wikipedia.org/wiki/Tree").unwrap();
        let json = serde_json::to_string(&page).unwrap();
        assert_eq!(json, "\"https://en.wikipedia.org/wiki/Tree\"");
    }
}
