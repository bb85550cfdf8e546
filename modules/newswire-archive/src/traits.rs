// Trait seam between the aggregation pipeline and the source fetchers.
//
// Gatherer holds an Arc<dyn ContentFetcher>; tests swap in MockFetcher for
// deterministic runs with no network.

use async_trait::async_trait;
use newswire_common::FetchOutcome;

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch an RSS/Atom feed. `locator` is a URL or a known feed alias.
    async fn feed(&self, locator: &str, label: &str) -> FetchOutcome;

    /// Run a news search over the last `lookback_days`.
    async fn search(&self, query: &str, lookback_days: u32) -> FetchOutcome;

    /// Extract one page through the scrape escalator.
    /// Success is `SinglePage`; exhausting every tier is `Failure`.
    async fn page(&self, url: &str) -> FetchOutcome;
}
