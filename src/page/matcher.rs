use crate::ConfigError;
use regex::Regex;

/// The corpus's addressable-article namespace
///
/// A canonical URL is an article iff it matches the configured regex. The
/// default pattern (`^https://en\.wikipedia\.org/wiki/[^:]*$`) admits main
/// namespace articles and rejects `File:`, `Talk:`, `Special:` and similar
/// namespaced pages as well as other hosts.
#[derive(Debug, Clone)]
pub struct ArticlePattern {
    regex: Regex,
}

impl ArticlePattern {
    /// Compiles an article pattern
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex =
            Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        Ok(Self { regex })
    }

    /// Returns true if the canonical URL is an article
    pub fn matches(&self, canonical_url: &str) -> bool {
        self.regex.is_match(canonical_url)
    }

    /// The source text of the pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for ArticlePattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(crate::config::DEFAULT_ARTICLE_PATTERN)
                .expect("default article pattern is a valid regex"),
        }
    }
}
