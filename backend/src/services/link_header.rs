//! Link Header Parser
//!
//! Parses RFC 5988 `Link` response headers into named relations, e.g.
//!
//! ```text
//! <https://api.github.com/user/1/repos?page=2>; rel="next", <https://api.github.com/user/1/repos?page=5>; rel="last"
//! ```
//!
//! Segments that do not look like `<url>; key="value"...` are skipped silently.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// One `<url>; attr="value"` segment
static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?P<url>[^>]*)>(?P<attrs>(?:\s*;\s*[A-Za-z0-9_\-*]+\s*=\s*(?:"[^"]*"|[^;,\s]*))*)"#)
        .expect("link segment pattern is valid")
});

/// One `; key="value"` (or unquoted `; key=value`) attribute
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#";\s*(?P<key>[A-Za-z0-9_\-*]+)\s*=\s*(?:"(?P<quoted>[^"]*)"|(?P<bare>[^;,\s]*))"#)
        .expect("link attribute pattern is valid")
});

/// A single named relation from a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    /// Relation name (`next`, `prev`, `last`, ...)
    pub rel: String,
    /// Target URL
    pub url: String,
    /// Query parameters of the URL, overlaid with the segment's explicit attributes
    pub params: HashMap<String, String>,
}

/// Parse a `Link` header value into a map of relation name to relation.
///
/// A segment declaring `rel="next last"` produces both keys pointing at the same URL.
/// Later segments overwrite earlier ones carrying the same relation name.
pub fn parse(header: &str) -> HashMap<String, LinkRelation> {
    let mut relations = HashMap::new();

    for segment in SEGMENT_RE.captures_iter(header) {
        let url = segment["url"].trim().to_string();
        let attrs = segment.name("attrs").map_or("", |m| m.as_str());

        let mut params = query_params(&url);
        let mut rel_value = None;

        for attr in ATTR_RE.captures_iter(attrs) {
            let key = attr["key"].to_ascii_lowercase();
            let value = attr
                .name("quoted")
                .or_else(|| attr.name("bare"))
                .map_or("", |m| m.as_str())
                .to_string();

            if key == "rel" {
                rel_value = Some(value);
            } else {
                params.insert(key, value);
            }
        }

        let Some(rel_value) = rel_value else {
            continue;
        };

        for rel in rel_value.split_whitespace() {
            relations.insert(
                rel.to_string(),
                LinkRelation {
                    rel: rel.to_string(),
                    url: url.clone(),
                    params: params.clone(),
                },
            );
        }
    }

    relations
}

/// Decoded query-string parameters of `url`; empty when the URL does not parse
fn query_params(url: &str) -> HashMap<String, String> {
    Url::parse(url)
        .map(|parsed| {
            parsed
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_header() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_simple_next() {
        let links = parse(r#"<https://api.github.com/user/repos?page=2>; rel="next""#);

        let next = links.get("next").expect("next relation");
        assert_eq!(next.url, "https://api.github.com/user/repos?page=2");
        assert_eq!(next.rel, "next");
        assert_eq!(next.params.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_github_style_header() {
        let header = concat!(
            r#"<https://api.github.com/user/9/repos?sort=pushed&page=2>; rel="next", "#,
            r#"<https://api.github.com/user/9/repos?sort=pushed&page=4>; rel="last""#
        );
        let links = parse(header);

        assert_eq!(links.len(), 2);
        assert_eq!(links["next"].params["page"], "2");
        assert_eq!(links["next"].params["sort"], "pushed");
        assert_eq!(links["last"].params["page"], "4");
    }

    #[test]
    fn test_multiple_relations_in_one_segment() {
        let links = parse(r#"<https://example.com/items?page=3>; rel="next last""#);

        assert_eq!(links.len(), 2);
        assert_eq!(links["next"].url, links["last"].url);
        assert_eq!(links["next"].rel, "next");
        assert_eq!(links["last"].rel, "last");
    }

    #[test]
    fn test_explicit_attributes_overlay_query_params() {
        let links = parse(
            r#"<https://example.com/items?page=3&per_page=10>; rel="next"; page="7"; title="Next page""#,
        );

        let next = &links["next"];
        assert_eq!(next.params["page"], "7");
        assert_eq!(next.params["per_page"], "10");
        assert_eq!(next.params["title"], "Next page");
        assert!(!next.params.contains_key("rel"));
    }

    #[test]
    fn test_later_segment_wins() {
        let links = parse(
            r#"<https://example.com/a>; rel="next", <https://example.com/b>; rel="next""#,
        );

        assert_eq!(links.len(), 1);
        assert_eq!(links["next"].url, "https://example.com/b");
    }

    #[test]
    fn test_malformed_segments_are_skipped() {
        let links = parse(r#"garbage, <https://example.com/x>; foo="bar", <https://example.com/y>; rel="prev""#);

        assert_eq!(links.len(), 1);
        assert_eq!(links["prev"].url, "https://example.com/y");
    }

    #[test]
    fn test_relative_url_has_no_query_params() {
        let links = parse(r#"</items?page=2>; rel="next""#);

        assert_eq!(links["next"].url, "/items?page=2");
        assert!(links["next"].params.is_empty());
    }
}
