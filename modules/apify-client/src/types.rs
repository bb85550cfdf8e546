use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// A start URL entry for crawler input.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrl {
    pub url: String,
}

/// Input for the apify/website-content-crawler actor, restricted to one page.
#[derive(Debug, Clone, Serialize)]
pub struct WebsiteCrawlerInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(rename = "crawlerType")]
    pub crawler_type: String,
    #[serde(rename = "maxCrawlDepth")]
    pub max_crawl_depth: u32,
    #[serde(rename = "maxCrawlPages")]
    pub max_crawl_pages: u32,
    #[serde(rename = "maxResults")]
    pub max_results: u32,
    #[serde(rename = "saveMarkdown")]
    pub save_markdown: bool,
    #[serde(rename = "removeCookieWarnings")]
    pub remove_cookie_warnings: bool,
}

impl WebsiteCrawlerInput {
    /// Single-page crawl with a real browser and markdown output.
    pub fn single_page(url: &str) -> Self {
        Self {
            start_urls: vec![StartUrl {
                url: url.to_string(),
            }],
            crawler_type: "playwright:adaptive".to_string(),
            max_crawl_depth: 0,
            max_crawl_pages: 1,
            max_results: 1,
            save_markdown: true,
            remove_cookie_warnings: true,
        }
    }
}

/// Page metadata reported by the crawler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawledPageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "canonicalUrl")]
    pub canonical_url: Option<String>,
}

/// One dataset item from the website-content-crawler.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawledPage {
    pub url: String,
    #[serde(default)]
    pub metadata: CrawledPageMetadata,
    pub markdown: Option<String>,
    pub text: Option<String>,
}

impl CrawledPage {
    /// Markdown body, falling back to plain text when markdown was not produced.
    pub fn body(&self) -> &str {
        self.markdown
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or(self.text.as_deref())
            .unwrap_or("")
    }
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_input_serializes_actor_fields() {
        let input = WebsiteCrawlerInput::single_page("https://example.com/story");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["startUrls"][0]["url"], "https://example.com/story");
        assert_eq!(json["maxCrawlPages"], 1);
        assert_eq!(json["maxCrawlDepth"], 0);
        assert_eq!(json["saveMarkdown"], true);
    }

    #[test]
    fn crawled_page_prefers_markdown_over_text() {
        let page: CrawledPage = serde_json::from_str(
            r##"{"url":"https://example.com","metadata":{"title":"Hello"},"markdown":"# Hello","text":"Hello"}"##,
        )
        .unwrap();
        assert_eq!(page.body(), "# Hello");
        assert_eq!(page.metadata.title.as_deref(), Some("Hello"));
    }

    #[test]
    fn crawled_page_falls_back_to_text_when_markdown_blank() {
        let page: CrawledPage =
            serde_json::from_str(r#"{"url":"https://example.com","markdown":"  ","text":"plain"}"#)
                .unwrap();
        assert_eq!(page.body(), "plain");
    }

    #[test]
    fn run_data_parses_status() {
        let run: ApiResponse<RunData> = serde_json::from_str(
            r#"{"data":{"id":"r1","status":"SUCCEEDED","defaultDatasetId":"d1","startedAt":null,"finishedAt":null}}"#,
        )
        .unwrap();
        assert_eq!(run.data.status, "SUCCEEDED");
        assert_eq!(run.data.default_dataset_id, "d1");
    }
}
