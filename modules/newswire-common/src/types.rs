use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Hard cap on article snippets, in characters.
pub const SNIPPET_MAX_CHARS: usize = 250;

/// Title used when a source gives none.
pub const UNTITLED: &str = "Untitled";

// --- Source descriptors ---

/// Which fetcher handles a descriptor. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[serde(alias = "rss")]
    Feed,
    Search,
    Scrape,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feed => write!(f, "feed"),
            Self::Search => write!(f, "search"),
            Self::Scrape => write!(f, "scrape"),
        }
    }
}

/// Declarative record naming where to pull candidate articles from.
///
/// Serialized in the same `{type, value, label}` shape the discovery
/// collaborator proposes, so config files and suggestions share one parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// URL for feed/scrape, query string for search.
    #[serde(rename = "value")]
    pub locator: String,
    pub label: String,
}

impl SourceDescriptor {
    pub fn new(kind: SourceKind, locator: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind,
            locator: locator.into(),
            label: label.into(),
        }
    }

    pub fn feed(locator: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(SourceKind::Feed, locator, label)
    }

    pub fn search(query: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(SourceKind::Search, query, label)
    }

    pub fn scrape(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(SourceKind::Scrape, url, label)
    }

    /// Identity used to spot the same source proposed twice.
    pub fn identity(&self) -> (SourceKind, String) {
        (self.kind, self.locator.trim().to_lowercase())
    }
}

// --- Articles ---

/// One normalized candidate news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Empty when the source gave no link. Never synthesized.
    pub url: String,
    pub source: String,
    pub date: String,
    pub snippet: String,
}

impl Article {
    /// Build an article, applying the title default and snippet truncation.
    pub fn new(
        title: Option<&str>,
        url: Option<&str>,
        source: &str,
        date: impl Into<String>,
        snippet: &str,
    ) -> Self {
        Self {
            title: normalize_title(title),
            url: url.map(str::trim).unwrap_or_default().to_string(),
            source: source.to_string(),
            date: date.into(),
            snippet: make_snippet(snippet),
        }
    }
}

/// Trimmed title, or `Untitled` when missing or blank.
pub fn normalize_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => UNTITLED.to_string(),
    }
}

/// Trim and cut to [`SNIPPET_MAX_CHARS`]. Never pads.
pub fn make_snippet(text: &str) -> String {
    truncate_chars(text.trim(), SNIPPET_MAX_CHARS)
        .trim_end()
        .to_string()
}

/// Cut a string to at most `max` chars, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// ISO-8601 timestamp in the shape articles carry.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// --- Fetch outcomes ---

/// What a single source fetch produced. Failures are data, never panics.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Items(Vec<Article>),
    SinglePage {
        title: String,
        content: String,
        url: String,
    },
    Failure(String),
}

impl FetchOutcome {
    pub fn failure(reason: impl fmt::Display) -> Self {
        Self::Failure(reason.to_string())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Readable content pulled from one page by one extraction tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub content: String,
}

impl ExtractionResult {
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

/// Terminal output of the aggregation pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherResult {
    pub articles: Vec<Article>,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_reads_suggestion_shape() {
        let d: SourceDescriptor = serde_json::from_str(
            r#"{"type":"scrape","value":"https://example.com/news","label":"example"}"#,
        )
        .unwrap();
        assert_eq!(d.kind, SourceKind::Scrape);
        assert_eq!(d.locator, "https://example.com/news");
        assert_eq!(d.label, "example");
    }

    #[test]
    fn rss_is_accepted_as_feed() {
        let d: SourceDescriptor =
            serde_json::from_str(r#"{"type":"rss","value":"basenotes","label":"bn"}"#).unwrap();
        assert_eq!(d.kind, SourceKind::Feed);
    }

    #[test]
    fn blank_title_becomes_untitled() {
        let a = Article::new(Some("   "), None, "src", "", "");
        assert_eq!(a.title, UNTITLED);
        assert_eq!(a.url, "");
    }

    #[test]
    fn snippet_is_truncated_not_padded() {
        let long = "é".repeat(400);
        let a = Article::new(Some("t"), Some("u"), "s", "", &long);
        assert_eq!(a.snippet.chars().count(), SNIPPET_MAX_CHARS);

        let short = Article::new(Some("t"), Some("u"), "s", "", "  tiny  ");
        assert_eq!(short.snippet, "tiny");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("naïve", 3), "naï");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn gather_result_serializes_as_articles_and_errors() {
        let result = GatherResult {
            articles: vec![Article::new(Some("A"), Some("https://a"), "s", "", "x")],
            errors: vec!["news (search): rate limited".into()],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["articles"][0]["title"], "A");
        assert_eq!(json["errors"][0], "news (search): rate limited");
    }

    #[test]
    fn identity_ignores_case_and_whitespace() {
        let a = SourceDescriptor::feed(" https://Example.com/feed ", "a");
        let b = SourceDescriptor::feed("https://example.com/feed", "b");
        assert_eq!(a.identity(), b.identity());
        assert_ne!(
            a.identity(),
            SourceDescriptor::scrape("https://example.com/feed", "a").identity()
        );
    }
}
