// Tier 2: render in the shared headless browser, then the same readability pass.

use std::sync::Arc;

use async_trait::async_trait;
use newswire_common::{ExtractionResult, ScrapeConfig};
use tracing::debug;

use super::tier::{ExtractionTier, TierError, TierLevel};
use crate::browser::{BrowserError, RenderOptions, SharedBrowser};
use crate::readability::extract_readable;

pub struct BrowserTier {
    browser: Arc<SharedBrowser>,
    options: RenderOptions,
    max_chars: usize,
}

impl BrowserTier {
    pub fn new(browser: Arc<SharedBrowser>, config: &ScrapeConfig) -> Self {
        Self {
            browser,
            options: RenderOptions {
                settle: config.browser_settle(),
                timeout: config.browser_timeout(),
            },
            max_chars: config.browser_max_chars,
        }
    }

    async fn render(&self, url: &str) -> Result<String, BrowserError> {
        let browser = self.browser.acquire().await?;
        let context = browser.new_context().await?;

        let deadline = self.options.timeout + self.options.settle;
        let rendered = tokio::time::timeout(deadline, context.render(url, &self.options))
            .await
            .unwrap_or(Err(BrowserError::Timeout(deadline)));

        context.close().await;
        rendered
    }
}

#[async_trait]
impl ExtractionTier for BrowserTier {
    fn level(&self) -> TierLevel {
        TierLevel::Browser
    }

    /// Escalates only on browser errors. Short rendered content is accepted.
    async fn attempt(&self, url: &str) -> Result<ExtractionResult, TierError> {
        let html = self.render(url).await.map_err(|e| match e {
            BrowserError::Timeout(d) => TierError::Timeout(d),
            other => TierError::Browser(other.to_string()),
        })?;
        let result = extract_readable(&html, self.max_chars);
        debug!(url, chars = result.content_chars(), "browser tier: extracted");
        Ok(result)
    }
}
