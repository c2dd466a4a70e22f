//! Inbound links through the MediaWiki API
//!
//! Article HTML only lists outbound links. The backward half of a
//! bidirectional search needs the reverse edges, which MediaWiki exposes as
//! `action=query&list=backlinks`. Only the first batch (up to 500 titles) of
//! main-namespace backlinks is requested.

use crate::fetcher::client::FetchFailure;
use crate::page::{encode_segment, ArticlePattern, Page};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const ARTICLE_PREFIX: &str = "/wiki/";

#[derive(Debug, Deserialize)]
struct BacklinksResponse {
    #[serde(default)]
    query: Option<BacklinksQuery>,
}

#[derive(Debug, Deserialize)]
struct BacklinksQuery {
    #[serde(default)]
    backlinks: Vec<BacklinkEntry>,
}

#[derive(Debug, Deserialize)]
struct BacklinkEntry {
    title: String,
}

/// Extracts the decoded article title from a page URL
///
/// Returns `None` for pages outside `/wiki/`.
pub fn article_title(page: &Page) -> Option<String> {
    let url = page.to_url().ok()?;
    let encoded = url.path().strip_prefix(ARTICLE_PREFIX)?;
    if encoded.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(encoded).ok()?;
    Some(decoded.replace('_', " "))
}

/// Builds the page for `title` on the same site as `sibling`
pub fn page_for_title(title: &str, sibling: &Url, pattern: &ArticlePattern) -> Option<Page> {
    let path = title
        .replace(' ', "_")
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/");
    Page::from_link(&format!("{}{}", ARTICLE_PREFIX, path), sibling, pattern).ok()
}

/// Lists the titles of main-namespace articles linking to `title`
pub async fn fetch_backlink_titles(
    client: &Client,
    api: &str,
    title: &str,
) -> Result<Vec<String>, FetchFailure> {
    let response = client
        .get(api)
        .query(&[
            ("action", "query"),
            ("list", "backlinks"),
            ("bltitle", title),
            ("blnamespace", "0"),
            ("bllimit", "max"),
            ("format", "json"),
        ])
        .send()
        .await
        .map_err(|e| FetchFailure::Network {
            error: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status {
            status_code: status.as_u16(),
        });
    }

    let body: BacklinksResponse = response.json().await.map_err(|e| FetchFailure::Network {
        error: format!("invalid backlinks response: {}", e),
    })?;

    Ok(body
        .query
        .map(|q| q.backlinks.into_iter().map(|entry| entry.title).collect())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(raw: &str) -> Page {
        Page::parse(raw).unwrap()
    }

    #[test]
    fn test_article_title_decodes() {
        assert_eq!(
            article_title(&page("https://en.wikipedia.org/wiki/Rust_(programming_language)")),
            Some("Rust (programming language)".to_string())
        );
        assert_eq!(
            article_title(&page("https://en.wikipedia.org/wiki/Caf%C3%A9")),
            Some("Café".to_string())
        );
        assert_eq!(
            article_title(&page("https://en.wikipedia.org/wiki/AT%26T")),
            Some("AT&T".to_string())
        );
    }

    #[test]
    fn test_article_title_outside_wiki() {
        assert_eq!(article_title(&page("https://en.wikipedia.org/w/index.php")), None);
    }

    #[test]
    fn test_page_for_title_matches_link_form() {
        let sibling = Url::parse("https://en.wikipedia.org/wiki/Tree").unwrap();
        let pattern = ArticlePattern::default();

        let from_title = page_for_title("AT&T", &sibling, &pattern).unwrap();
        let from_href = Page::from_link("/wiki/AT%26T", &sibling, &pattern).unwrap();
        assert_eq!(from_title, from_href);

        let from_title = page_for_title("Why?", &sibling, &pattern).unwrap();
        assert_eq!(from_title.as_str(), "https://en.wikipedia.org/wiki/Why%3F");

        let from_title = page_for_title("AC/DC", &sibling, &pattern).unwrap();
        assert_eq!(from_title.as_str(), "https://en.wikipedia.org/wiki/AC/DC");
    }

    #[test]
    fn test_title_round_trip() {
        let sibling = Url::parse("https://en.wikipedia.org/wiki/Tree").unwrap();
        let original = page("https://en.wikipedia.org/wiki/Caf%C3%A9_(film)");
        let title = article_title(&original).unwrap();
        assert_eq!(
            page_for_title(&title, &sibling, &ArticlePattern::default()),
            Some(original)
        );
    }
}
