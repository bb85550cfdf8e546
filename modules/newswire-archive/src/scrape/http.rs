// Tier 1: plain GET + readability heuristics.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use newswire_common::{ExtractionResult, ScrapeConfig};
use tracing::debug;

use super::tier::{require_min_chars, ExtractionTier, TierError, TierLevel};
use crate::readability::extract_readable;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; NewswireAgent/1.0)";

pub struct HttpTier {
    client: reqwest::Client,
    timeout: Duration,
    max_chars: usize,
    min_chars: usize,
}

impl HttpTier {
    pub fn new(config: &ScrapeConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build scrape HTTP client")?;
        Ok(Self {
            client,
            timeout: config.http_timeout(),
            max_chars: config.http_max_chars,
            min_chars: config.http_min_chars,
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<String, TierError> {
        let resp = self.client.get(url).send().await.map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TierError::Status(status.as_u16()));
        }

        resp.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> TierError {
        if err.is_timeout() {
            TierError::Timeout(self.timeout)
        } else {
            TierError::from(err)
        }
    }
}

#[async_trait]
impl ExtractionTier for HttpTier {
    fn level(&self) -> TierLevel {
        TierLevel::Http
    }

    async fn attempt(&self, url: &str) -> Result<ExtractionResult, TierError> {
        let html = self.fetch_html(url).await?;
        let result = extract_readable(&html, self.max_chars);
        debug!(url, bytes = html.len(), chars = result.content_chars(), "http tier: extracted");
        // Short output means the page renders client-side.
        require_min_chars(result, self.min_chars)
    }
}
