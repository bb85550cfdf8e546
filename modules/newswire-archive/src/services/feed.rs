// RSS/Atom feed service.
// Returns normalized Articles as a FetchOutcome.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use newswire_common::{iso_timestamp, Article, FeedConfig, FetchOutcome};
use tracing::{info, warn};

use crate::readability::fragment_text;

const USER_AGENT: &str = "NewswireAgent/1.0";

/// Short names accepted in place of a feed URL.
const KNOWN_FEEDS: &[(&str, &str)] = &[
    ("fragrantica", "https://www.fragrantica.com/news/rss"),
    ("basenotes", "https://basenotes.com/feed/"),
    ("cafleurebon", "https://www.cafleurebon.com/feed/"),
    ("perfumesociety", "https://perfumesociety.org/feed/"),
];

/// Resolve a feed locator to `(url, source name)`.
/// An alias resolves to its URL and names the source after itself.
pub fn resolve_feed(locator: &str, label: &str) -> (String, String) {
    let key = locator.trim().to_lowercase();
    match KNOWN_FEEDS.iter().find(|(alias, _)| *alias == key) {
        Some((alias, url)) => (url.to_string(), alias.to_string()),
        None => (locator.trim().to_string(), label.to_string()),
    }
}

pub fn known_feed_names() -> Vec<&'static str> {
    KNOWN_FEEDS.iter().map(|(alias, _)| *alias).collect()
}

pub struct FeedFetcher {
    client: reqwest::Client,
    config: FeedConfig,
}

impl FeedFetcher {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build feed HTTP client")?;
        Ok(Self { client, config })
    }

    /// Fetch a feed and map its entries to articles.
    /// Transport, timeout and parse problems come back as `Failure`.
    pub async fn fetch(&self, locator: &str, label: &str) -> FetchOutcome {
        if locator.trim().is_empty() {
            return FetchOutcome::failure(format!(
                "No feed specified for {label}. Available feeds: {}",
                known_feed_names().join(", ")
            ));
        }

        let (url, source) = resolve_feed(locator, label);

        let fetched =
            tokio::time::timeout(self.config.timeout(), self.fetch_articles(&url, &source)).await;

        match fetched {
            Ok(Ok(articles)) => {
                info!(
                    feed_url = url.as_str(),
                    source = source.as_str(),
                    items = articles.len(),
                    "feed: parsed successfully"
                );
                FetchOutcome::Items(articles)
            }
            Ok(Err(e)) => {
                warn!(
                    feed_url = url.as_str(),
                    source = source.as_str(),
                    error = %e,
                    "feed: fetch failed"
                );
                FetchOutcome::failure(format!("Failed to fetch {source} ({url}): {e:#}"))
            }
            Err(_) => {
                warn!(feed_url = url.as_str(), source = source.as_str(), "feed: timed out");
                FetchOutcome::failure(format!(
                    "Failed to fetch {source} ({url}): timed out after {}s",
                    self.config.timeout_secs
                ))
            }
        }
    }

    async fn fetch_articles(&self, url: &str, source: &str) -> Result<Vec<Article>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("feed request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {}", status.as_u16());
        }

        let bytes = resp.bytes().await.context("Failed to read feed body")?;
        parse_feed_articles(&bytes, source, Utc::now(), self.config.max_items)
    }
}

/// Parse RSS/Atom/JSON feed bytes into at most `max_items` articles.
/// Entries without a publish timestamp are dated `now`.
pub fn parse_feed_articles(
    bytes: &[u8],
    source: &str,
    now: DateTime<Utc>,
    max_items: usize,
) -> Result<Vec<Article>> {
    let feed = feed_rs::parser::parse(bytes).context("Failed to parse RSS/Atom feed")?;

    let articles = feed
        .entries
        .into_iter()
        .take(max_items)
        .map(|entry| {
            let title = entry.title.map(|t| t.content);
            let link = entry.links.first().map(|l| l.href.clone());
            let date = entry
                .published
                .or(entry.updated)
                .map(iso_timestamp)
                .unwrap_or_else(|| iso_timestamp(now));
            let body = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            Article::new(
                title.as_deref(),
                link.as_deref(),
                source,
                date,
                &fragment_text(&body),
            )
        })
        .collect();

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    const RSS: &str = r#"<?xml version="1.0"?>
        <rss version="2.0"><channel><title>Notes</title>
          <item>
            <title>  Spring launch  </title>
            <link>https://example.com/spring</link>
            <pubDate>Tue, 20 May 2025 08:00:00 GMT</pubDate>
            <description>&lt;p&gt;A &lt;b&gt;green&lt;/b&gt; floral.&lt;/p&gt;</description>
          </item>
          <item>
            <description>No title, no link, no date.</description>
          </item>
        </channel></rss>"#;

    #[test]
    fn maps_rss_items_to_articles() {
        let articles = parse_feed_articles(RSS.as_bytes(), "notes", now(), 15).unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.title, "Spring launch");
        assert_eq!(first.url, "https://example.com/spring");
        assert_eq!(first.source, "notes");
        assert_eq!(first.date, "2025-05-20T08:00:00Z");
        assert_eq!(first.snippet, "A green floral.");

        let second = &articles[1];
        assert_eq!(second.title, "Untitled");
        assert_eq!(second.url, "");
        assert_eq!(second.date, "2025-06-01T12:00:00Z");
    }

    #[test]
    fn caps_entries() {
        let items: String = (0..30)
            .map(|i| format!("<item><title>Item {i}</title></item>"))
            .collect();
        let xml = format!(r#"<rss version="2.0"><channel><title>t</title>{items}</channel></rss>"#);
        let articles = parse_feed_articles(xml.as_bytes(), "s", now(), 15).unwrap();
        assert_eq!(articles.len(), 15);
        assert_eq!(articles[0].title, "Item 0");
    }

    #[test]
    fn empty_feed_is_not_an_error() {
        let xml = r#"<rss version="2.0"><channel><title>quiet</title></channel></rss>"#;
        let articles = parse_feed_articles(xml.as_bytes(), "s", now(), 15).unwrap();
        assert!(articles.is_empty());
    }

    #[test]
    fn atom_entries_use_published_and_summary() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <feed xmlns="http://www.w3.org/2005/Atom">
              <title>Blog</title><id>urn:blog</id><updated>2025-05-02T00:00:00Z</updated>
              <entry>
                <title>Atom post</title><id>urn:1</id>
                <link href="https://blog.example/post"/>
                <published>2025-05-01T10:00:00Z</published>
                <updated>2025-05-02T00:00:00Z</updated>
                <summary>Short summary</summary>
              </entry>
            </feed>"#;
        let articles = parse_feed_articles(xml.as_bytes(), "blog", now(), 15).unwrap();
        assert_eq!(articles[0].url, "https://blog.example/post");
        assert_eq!(articles[0].date, "2025-05-01T10:00:00Z");
        assert_eq!(articles[0].snippet, "Short summary");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(parse_feed_articles(b"definitely not xml", "s", now(), 15).is_err());
    }

    #[test]
    fn aliases_resolve_to_known_urls() {
        let (url, source) = resolve_feed("Basenotes", "label");
        assert_eq!(url, "https://basenotes.com/feed/");
        assert_eq!(source, "basenotes");

        let (url, source) = resolve_feed("https://other.example/rss", "other");
        assert_eq!(url, "https://other.example/rss");
        assert_eq!(source, "other");
    }

    #[tokio::test]
    async fn blank_locator_fails_without_network() {
        let fetcher = FeedFetcher::new(FeedConfig::default()).unwrap();
        let outcome = fetcher.fetch("  ", "empty").await;
        match outcome {
            FetchOutcome::Failure(reason) => assert!(reason.contains("basenotes")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
