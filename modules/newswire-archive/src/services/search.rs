// News search service: NewsAPI when credentialed, Google News RSS otherwise.
// Both strategies return normalized Articles as a FetchOutcome.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use newswire_common::{iso_timestamp, Article, FetchOutcome, NewswireError, SearchConfig};
use serde::Deserialize;
use tracing::{info, warn};

use crate::readability::fragment_text;

const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";
const GOOGLE_NEWS_URL: &str = "https://news.google.com/rss/search";

/// Query used when a search descriptor carries none.
pub const DEFAULT_QUERY: &str = "perfume OR fragrance OR perfumery OR cologne";

/// Google News titles end with `" - <publisher>"`.
const TITLE_SOURCE_DELIMITER: &str = " - ";
const FALLBACK_SOURCE: &str = "Google News";
const NEWSAPI_SOURCE: &str = "NewsAPI";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    source: Option<NewsApiSource>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Resolves queries into articles, picking the strategy by credential presence.
pub struct SearchFetcher {
    primary: Option<NewsApiSearcher>,
    fallback: GoogleNewsSearcher,
    config: SearchConfig,
}

impl SearchFetcher {
    pub fn new(newsapi_key: Option<&str>, config: SearchConfig) -> Result<Self> {
        let primary = newsapi_key
            .filter(|k| !k.is_empty())
            .map(|k| NewsApiSearcher::new(k, &config))
            .transpose()?;
        Ok(Self {
            primary,
            fallback: GoogleNewsSearcher::new(&config)?,
            config,
        })
    }

    pub fn strategy(&self) -> &'static str {
        if self.primary.is_some() {
            "NewsAPI"
        } else {
            "Google News RSS"
        }
    }

    pub async fn search(&self, query: &str, lookback_days: u32) -> FetchOutcome {
        let query = if query.trim().is_empty() {
            DEFAULT_QUERY
        } else {
            query.trim()
        };

        let outcome = match &self.primary {
            Some(newsapi) => {
                newsapi
                    .search(query, lookback_days, Utc::now(), self.config.max_results)
                    .await
            }
            None => {
                info!(query, "search: no NEWSAPI_KEY set, using Google News RSS fallback");
                self.fallback.search(query, self.config.max_results).await
            }
        };

        match &outcome {
            FetchOutcome::Items(items) => {
                info!(query, via = self.strategy(), count = items.len(), "search: complete")
            }
            FetchOutcome::Failure(reason) => {
                warn!(query, via = self.strategy(), reason = reason.as_str(), "search: failed")
            }
            FetchOutcome::SinglePage { .. } => {}
        }
        outcome
    }
}

// --- NewsAPI ---

pub struct NewsApiSearcher {
    api_key: String,
    client: reqwest::Client,
}

impl NewsApiSearcher {
    pub fn new(api_key: &str, config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .timeout(config.timeout())
                .build()
                .context("Failed to build NewsAPI HTTP client")?,
        })
    }

    /// Query the `[now - lookback_days, now]` window, newest first. Never retries.
    pub async fn search(
        &self,
        query: &str,
        lookback_days: u32,
        now: DateTime<Utc>,
        max_results: usize,
    ) -> FetchOutcome {
        let Some((from, to)) = lookback_window(now, lookback_days) else {
            return FetchOutcome::failure(format!(
                "lookback of {lookback_days} days is outside the supported date range"
            ));
        };
        let page_size = max_results.to_string();

        let resp = self
            .client
            .get(NEWSAPI_URL)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", query),
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            Err(e) => return FetchOutcome::failure(format!("NewsAPI request failed: {e}")),
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => return FetchOutcome::failure(format!("NewsAPI request failed: {e}")),
        };

        match parse_newsapi_response(&body, max_results) {
            Ok(articles) => FetchOutcome::Items(articles),
            Err(e) if status.is_success() => FetchOutcome::failure(e),
            Err(e) => FetchOutcome::failure(format!("HTTP {}: {e}", status.as_u16())),
        }
    }
}

/// `(from, to)` as `YYYY-MM-DD`. `None` when the window start is not representable.
pub fn lookback_window(now: DateTime<Utc>, lookback_days: u32) -> Option<(String, String)> {
    let from = TimeDelta::try_days(i64::from(lookback_days))
        .and_then(|span| now.checked_sub_signed(span))?;
    Some((
        from.format("%Y-%m-%d").to_string(),
        now.format("%Y-%m-%d").to_string(),
    ))
}

/// Map a NewsAPI body to articles. A non-`ok` status surfaces the API's message.
pub fn parse_newsapi_response(
    body: &str,
    max_results: usize,
) -> std::result::Result<Vec<Article>, NewswireError> {
    let data: NewsApiResponse = serde_json::from_str(body)
        .map_err(|e| NewswireError::MalformedResponse(format!("NewsAPI: {e}")))?;

    if data.status != "ok" {
        return Err(NewswireError::SourceFetch {
            source_label: NEWSAPI_SOURCE.to_string(),
            reason: data
                .message
                .unwrap_or_else(|| "request rejected".to_string()),
        });
    }

    Ok(data
        .articles
        .into_iter()
        .take(max_results)
        .map(|a| {
            let source = a
                .source
                .and_then(|s| s.name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| NEWSAPI_SOURCE.to_string());
            Article::new(
                a.title.as_deref(),
                a.url.as_deref(),
                &source,
                a.published_at.unwrap_or_default(),
                a.description.as_deref().unwrap_or(""),
            )
        })
        .collect())
}

// --- Google News RSS fallback ---

pub struct GoogleNewsSearcher {
    client: reqwest::Client,
}

impl GoogleNewsSearcher {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(config.timeout())
                .user_agent(BROWSER_USER_AGENT)
                .build()
                .context("Failed to build Google News HTTP client")?,
        })
    }

    pub async fn search(&self, query: &str, max_results: usize) -> FetchOutcome {
        match self.fetch(query, max_results).await {
            Ok(articles) => FetchOutcome::Items(articles),
            Err(e) => FetchOutcome::failure(format!("Google News search failed: {e:#}")),
        }
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<Article>> {
        let url = google_news_url(query)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Google News request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {}", status.as_u16());
        }

        let bytes = resp.bytes().await.context("Failed to read Google News body")?;
        parse_google_news(&bytes, max_results)
    }
}

pub fn google_news_url(query: &str) -> Result<url::Url> {
    url::Url::parse_with_params(
        GOOGLE_NEWS_URL,
        &[("q", query), ("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")],
    )
    .context("Failed to build Google News URL")
}

/// Parse Google News RSS, recovering `(title, source)` from each item title.
pub fn parse_google_news(bytes: &[u8], max_results: usize) -> Result<Vec<Article>> {
    let feed = feed_rs::parser::parse(bytes).context("Failed to parse Google News feed")?;

    Ok(feed
        .entries
        .into_iter()
        .take(max_results)
        .map(|entry| {
            let raw_title = entry.title.map(|t| t.content).unwrap_or_default();
            let (title, publisher) = split_title_source(&raw_title);
            let source = publisher
                .or_else(|| {
                    entry
                        .authors
                        .first()
                        .map(|p| p.name.trim().to_string())
                        .filter(|n| !n.is_empty())
                })
                .unwrap_or_else(|| FALLBACK_SOURCE.to_string());
            let date = entry
                .published
                .or(entry.updated)
                .map(iso_timestamp)
                .unwrap_or_default();
            let body = entry.summary.map(|s| s.content).unwrap_or_default();

            Article::new(
                Some(&title),
                entry.links.first().map(|l| l.href.as_str()),
                &source,
                date,
                &fragment_text(&body),
            )
        })
        .collect())
}

/// Split `"<title> - <source>"` on the last delimiter.
/// Without a delimiter past position 0 the whole string is the title.
pub fn split_title_source(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim();
    match raw.rfind(TITLE_SOURCE_DELIMITER) {
        Some(idx) if idx > 0 => {
            let title = raw[..idx].trim().to_string();
            let source = raw[idx + TITLE_SOURCE_DELIMITER.len()..].trim().to_string();
            (title, Some(source).filter(|s| !s.is_empty()))
        }
        _ => (raw.to_string(), None),
    }
}
