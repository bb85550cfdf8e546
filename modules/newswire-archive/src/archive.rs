// Archive: the production ContentFetcher.
//
// Owns the feed and search services, the scrape escalator and the shared
// browser behind it. Call `shutdown()` once at the end of the run.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use newswire_common::{AppConfig, FetchOutcome, FileConfig};
use tracing::info;

use crate::browser::{BrowserlessLauncher, SharedBrowser};
use crate::scrape::{
    BrowserTier, DomainRouter, ExtractionTier, HttpTier, ManagedTier, ScrapeEscalator,
};
use crate::services::{FeedFetcher, SearchFetcher};
use crate::traits::ContentFetcher;

pub struct Archive {
    feed: FeedFetcher,
    search: SearchFetcher,
    escalator: ScrapeEscalator,
    browser: Arc<SharedBrowser>,
}

impl Archive {
    pub fn new(config: &AppConfig, file: &FileConfig) -> Result<Self> {
        let browser = Arc::new(SharedBrowser::new(BrowserlessLauncher::new(
            config.browserless_url.clone(),
            config.browserless_token.clone(),
        )));

        let tiers: Vec<Arc<dyn ExtractionTier>> = vec![
            Arc::new(HttpTier::new(&file.scrape)?),
            Arc::new(BrowserTier::new(Arc::clone(&browser), &file.scrape)),
            Arc::new(ManagedTier::from_token(
                config.apify_api_token.as_deref(),
                &file.scrape,
            )),
        ];
        let escalator = ScrapeEscalator::new(
            tiers,
            DomainRouter::new(&file.scrape.hardened_domains),
        );
        Self::with_escalator(config, file, escalator, browser)
    }

    /// Wire a prebuilt scrape ladder. `browser` is the handle its rendered tier
    /// shares, released by `shutdown()`.
    pub fn with_escalator(
        config: &AppConfig,
        file: &FileConfig,
        escalator: ScrapeEscalator,
        browser: Arc<SharedBrowser>,
    ) -> Result<Self> {
        let search = SearchFetcher::new(config.newsapi_key.as_deref(), file.search.clone())?;
        info!(strategy = search.strategy(), "archive: search strategy selected");

        Ok(Self {
            feed: FeedFetcher::new(file.feed.clone())?,
            search,
            escalator,
            browser,
        })
    }

    /// Release the shared browser. Idempotent.
    pub async fn shutdown(&self) {
        self.browser.release().await;
    }
}

#[async_trait]
impl ContentFetcher for Archive {
    async fn feed(&self, locator: &str, label: &str) -> FetchOutcome {
        self.feed.fetch(locator, label).await
    }

    async fn search(&self, query: &str, lookback_days: u32) -> FetchOutcome {
        self.search.search(query, lookback_days).await
    }

    async fn page(&self, url: &str) -> FetchOutcome {
        match self.escalator.extract(url).await {
            Ok(result) => FetchOutcome::SinglePage {
                title: result.title,
                content: result.content,
                url: url.to_string(),
            },
            Err(failure) => FetchOutcome::failure(failure),
        }
    }
}
