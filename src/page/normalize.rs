use crate::{PageError, PageResult};
use url::Url;

/// Canonicalizes a link into the absolute form used as a page identity
///
/// # Canonicalization Steps
///
/// 1. Resolve the link against `base` (if given); reject if malformed
/// 2. Require an HTTP(S) scheme and a host
/// 3. Lowercase the host
/// 4. Normalize the path:
///    - Remove dot segments (. and ..) and empty segments
///    - Remove trailing slash (except for root /)
///    - Re-encode every segment with one fixed escaping rule, so that
///      `AT&T`, `AT%26T` and `Caf%C3%A9`/`Café` spellings agree
/// 5. Remove the fragment
/// 6. Remove the query string (articles are addressed by path alone)
///
/// Applying the function to its own output yields the same URL.
///
/// # Examples
///
/// ```
/// use wiki_race::page::canonicalize;
///
/// let url = canonicalize("HTTPS://EN.WIKIPEDIA.ORG/wiki/Rust_(programming_language)#History", None).unwrap();
/// assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/Rust_(programming_language)");
/// ```
pub fn canonicalize(raw: &str, base: Option<&Url>) -> PageResult<Url> {
    let raw = raw.trim();

    let mut url = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    }
    .map_err(|e| PageError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(PageError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url
        .host_str()
        .ok_or(PageError::MissingHost)?
        .to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| PageError::Parse(format!("Failed to set host: {}", e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);
    url.set_query(None);

    Ok(url)
}

/// Normalizes a URL path by removing dot segments, empty segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let encoded: Vec<String> = segments
        .into_iter()
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => encode_segment(&decoded),
            // Not valid UTF-8 once decoded; leave as found
            Err(_) => segment.to_string(),
        })
        .collect();

    format!("/{}", encoded.join("/"))
}

/// Characters MediaWiki leaves unescaped in article paths
const PATH_SAFE: &[(&str, &str)] = &[
    ("%3B", ";"),
    ("%40", "@"),
    ("%24", "$"),
    ("%21", "!"),
    ("%2A", "*"),
    ("%28", "("),
    ("%29", ")"),
    ("%2C", ","),
    ("%7E", "~"),
    ("%3A", ":"),
];

/// Percent-encodes one decoded path segment
pub(crate) fn encode_segment(segment: &str) -> String {
    let mut encoded = urlencoding::encode(segment).into_owned();
    for (escaped, raw) in PATH_SAFE {
        if encoded.contains(escaped) {
            encoded = encoded.replace(escaped, raw);
        }
    }
    encoded
}
