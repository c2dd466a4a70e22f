//! HTML parser for extracting article links and body text
//!
//! This module handles parsing article HTML to extract:
//! - Outbound links to other articles (from `<a>` tags)
//! - The paragraph text used to build content profiles

use crate::page::{ArticlePattern, Page};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an article page
#[derive(Debug, Clone, Default)]
pub struct ParsedArticle {
    /// Distinct article links, in document order
    pub links: Vec<Page>,

    /// Number of `<a href>` elements seen, including filtered ones
    pub total_links: usize,

    /// Text of all `<p>` elements, space separated
    pub text: String,
}

/// Parses article HTML
///
/// # Link Extraction Rules
///
/// **Counted in `total_links`:** every `<a href="...">`.
///
/// **Kept in `links`:**
/// - Links that resolve against `base_url` to an HTTP(S) URL
/// - whose canonical form matches the article pattern
/// - deduplicated, first occurrence wins
///
/// **Excluded:**
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links (same page anchors)
/// - `<a href="..." download>`
/// - Links outside the article namespace
///
/// # Example
///
/// ```
/// use wiki_race::fetcher::parse_article;
/// use wiki_race::ArticlePattern;
/// use url::Url;
///
/// let html = r#"<p>Trees have <a href="/wiki/Leaf">leaves</a>.</p><a href="/wiki/File:Oak.jpg">img</a>"#;
/// let base = Url::parse("https://en.wikipedia.org/wiki/Tree").unwrap();
/// let parsed = parse_article(html, &base, &ArticlePattern::default());
/// assert_eq!(parsed.links.len(), 1);
/// assert_eq!(parsed.total_links, 2);
/// ```
pub fn parse_article(html: &str, base_url: &Url, pattern: &ArticlePattern) -> ParsedArticle {
    let document = Html::parse_document(html);

    let (links, total_links) = extract_links(&document, base_url, pattern);
    let text = extract_paragraph_text(&document);

    ParsedArticle {
        links,
        total_links,
        text,
    }
}

/// Extracts article links from the HTML document
fn extract_links(document: &Html, base_url: &Url, pattern: &ArticlePattern) -> (Vec<Page>, usize) {
    let mut links = Vec::new();
    let mut seen = HashSet::new();
    let mut total = 0;

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return (links, total);
    };

    for element in document.select(&a_selector) {
        total += 1;

        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if !is_followable(href) {
            continue;
        }

        if let Ok(page) = Page::from_link(href, base_url, pattern) {
            if seen.insert(page.clone()) {
                links.push(page);
            }
        }
    }

    (links, total)
}

/// Rejects hrefs that can never name another article
fn is_followable(href: &str) -> bool {
    let href = href.trim();

    !(href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:"))
}

/// Joins the text of every paragraph
fn extract_paragraph_text(document: &Html) -> String {
    let Ok(p_selector) = Selector::parse("p") else {
        return String::new();
    };

    document
        .select(&p_selector)
        .map(|element| element.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
