// Aggregation pipeline: fan out one fetch per source, wait for all, merge.
//
// A failed source becomes one labeled line in `errors` and never stops the
// others. Articles come out in source order regardless of completion order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use newswire_common::{
    iso_timestamp, Article, FetchOutcome, GatherResult, SourceDescriptor, SourceKind,
};
use tracing::{debug, info, warn};

use crate::services::search::DEFAULT_QUERY;
use crate::traits::ContentFetcher;

pub struct Gatherer {
    fetcher: Arc<dyn ContentFetcher>,
    lookback_days: u32,
}

impl Gatherer {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, lookback_days: u32) -> Self {
        Self {
            fetcher,
            lookback_days,
        }
    }

    /// Fetch every source concurrently and merge the outcomes.
    pub async fn gather(&self, sources: &[SourceDescriptor]) -> GatherResult {
        info!(sources = sources.len(), "gather: dispatching");

        let outcomes = join_all(sources.iter().map(|source| self.dispatch(source))).await;
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        debug!(failed, "gather: all sources settled");
        let result = merge(sources, outcomes, Utc::now());

        info!(
            articles = result.articles.len(),
            errors = result.errors.len(),
            "gather: complete"
        );
        result
    }

    async fn dispatch(&self, source: &SourceDescriptor) -> FetchOutcome {
        match source.kind {
            SourceKind::Feed => self.fetcher.feed(&source.locator, &source.label).await,
            SourceKind::Search => {
                let query = match source.locator.trim() {
                    "" => DEFAULT_QUERY,
                    q => q,
                };
                self.fetcher.search(query, self.lookback_days).await
            }
            SourceKind::Scrape => self.fetcher.page(&source.locator).await,
        }
    }
}

/// Merge outcomes, paired with their sources, into one result.
/// Single pages become one article titled from the page or, failing that, the label.
pub fn merge(
    sources: &[SourceDescriptor],
    outcomes: Vec<FetchOutcome>,
    fetched_at: DateTime<Utc>,
) -> GatherResult {
    let mut result = GatherResult::default();

    for (source, outcome) in sources.iter().zip(outcomes) {
        match outcome {
            FetchOutcome::Items(items) => result.articles.extend(items),
            FetchOutcome::SinglePage {
                title,
                content,
                url,
            } => {
                let title = if title.trim().is_empty() {
                    source.label.as_str()
                } else {
                    title.as_str()
                };
                result.articles.push(Article::new(
                    Some(title),
                    Some(&url),
                    &source.label,
                    iso_timestamp(fetched_at),
                    &content,
                ));
            }
            FetchOutcome::Failure(reason) => {
                warn!(
                    label = source.label.as_str(),
                    kind = %source.kind,
                    reason = reason.as_str(),
                    "gather: source failed"
                );
                result
                    .errors
                    .push(format!("{} ({}): {}", source.label, source.kind, reason));
            }
        }
    }

    result
}
