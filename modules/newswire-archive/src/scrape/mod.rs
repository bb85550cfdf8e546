// Tiered scrape escalation.
//
// Tiers run strictly one after another, cheapest first; the first success wins.
// Hardened hosts skip straight to the managed tier.

pub mod http;
pub mod managed;
pub mod render;
pub mod router;
pub mod tier;

use std::fmt;
use std::sync::Arc;

use newswire_common::{ExtractionResult, NewswireError};
use tracing::{info, warn};

pub use http::HttpTier;
pub use managed::{ManagedExtractor, ManagedPage, ManagedTier};
pub use render::BrowserTier;
pub use router::DomainRouter;
pub use tier::{ExtractionTier, TierError, TierLevel};

/// One tier's reason for giving up.
#[derive(Debug)]
pub struct TierFailure {
    pub level: TierLevel,
    pub error: TierError,
}

/// Every applicable tier failed for `url`.
#[derive(Debug)]
pub struct ExtractionFailure {
    pub url: String,
    pub attempts: Vec<TierFailure>,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return write!(f, "no extraction tier applies to {}", self.url);
        }
        write!(f, "all extraction tiers failed for {}: ", self.url)?;
        for (i, attempt) in self.attempts.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", NewswireError::from(attempt))?;
        }
        Ok(())
    }
}

impl std::error::Error for ExtractionFailure {}

impl From<&TierFailure> for NewswireError {
    fn from(failure: &TierFailure) -> Self {
        NewswireError::Extraction {
            tier: failure.level.to_string(),
            reason: failure.error.to_string(),
        }
    }
}

/// Run `tiers` in order until one succeeds. Never runs two tiers at once.
pub async fn first_success(
    url: &str,
    tiers: &[Arc<dyn ExtractionTier>],
) -> Result<ExtractionResult, ExtractionFailure> {
    let mut attempts = Vec::new();

    for tier in tiers {
        let level = tier.level();
        match tier.attempt(url).await {
            Ok(result) => {
                info!(
                    url,
                    tier = level.name(),
                    chars = result.content_chars(),
                    "scrape: extracted"
                );
                return Ok(result);
            }
            Err(error) => {
                warn!(url, tier = level.name(), error = %error, "scrape: tier failed, escalating");
                attempts.push(TierFailure { level, error });
            }
        }
    }

    Err(ExtractionFailure {
        url: url.to_string(),
        attempts,
    })
}

/// Ordered extraction ladder plus the domain table that can shortcut it.
pub struct ScrapeEscalator {
    tiers: Vec<Arc<dyn ExtractionTier>>,
    router: DomainRouter,
}

impl ScrapeEscalator {
    pub fn new(mut tiers: Vec<Arc<dyn ExtractionTier>>, router: DomainRouter) -> Self {
        // Stable sort keeps caller order among equal levels.
        tiers.sort_by_key(|t| t.level());
        Self { tiers, router }
    }

    /// Tiers that apply to `url`, in execution order.
    pub fn plan(&self, url: &str) -> Vec<Arc<dyn ExtractionTier>> {
        let hardened = self.router.is_hardened(url);
        self.tiers
            .iter()
            .filter(|t| !hardened || t.level() == TierLevel::Managed)
            .cloned()
            .collect()
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractionResult, ExtractionFailure> {
        let plan = self.plan(url);
        if plan.len() < self.tiers.len() {
            info!(url, "scrape: hardened domain, skipping to managed extraction");
        }
        first_success(url, &plan).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTier;

    fn ok(content: &str) -> Result<ExtractionResult, TierError> {
        Ok(ExtractionResult {
            title: "T".into(),
            content: content.into(),
        })
    }

    #[tokio::test]
    async fn first_success_stops_at_winner() {
        let t1 = Arc::new(MockTier::new(TierLevel::Http, || Err(TierError::Status(503))));
        let t2 = Arc::new(MockTier::new(TierLevel::Browser, || ok("rendered")));
        let t3 = Arc::new(MockTier::new(TierLevel::Managed, || ok("managed")));
        let tiers: Vec<Arc<dyn ExtractionTier>> = vec![t1.clone(), t2.clone(), t3.clone()];

        let result = first_success("https://x.example", &tiers).await.unwrap();
        assert_eq!(result.content, "rendered");
        assert_eq!((t1.calls(), t2.calls(), t3.calls()), (1, 1, 0));
    }

    #[tokio::test]
    async fn exhaustion_summarizes_every_tier() {
        let tiers: Vec<Arc<dyn ExtractionTier>> = vec![
            Arc::new(MockTier::new(TierLevel::Http, || {
                Err(TierError::InsufficientContent { got: 40, min: 100 })
            })),
            Arc::new(MockTier::new(TierLevel::Managed, || {
                Err(TierError::MissingCredential("APIFY_API_TOKEN"))
            })),
        ];
        let err = first_success("https://x.example/a", &tiers).await.unwrap_err();
        assert_eq!(err.attempts.len(), 2);
        let message = err.to_string();
        assert!(message.contains("https://x.example/a"));
        assert!(message.contains("tier 1 (http) failed: insufficient content: 40 chars"));
        assert!(message.contains("tier 3 (managed) failed: APIFY_API_TOKEN not set"));
    }

    #[tokio::test]
    async fn empty_ladder_is_a_failure() {
        let err = first_success("https://x.example", &[]).await.unwrap_err();
        assert!(err.to_string().starts_with("no extraction tier applies"));
    }

    #[tokio::test]
    async fn tiers_are_ordered_by_level() {
        let tiers: Vec<Arc<dyn ExtractionTier>> = vec![
            Arc::new(MockTier::new(TierLevel::Managed, || ok("m"))),
            Arc::new(MockTier::new(TierLevel::Http, || ok("h"))),
        ];
        let escalator = ScrapeEscalator::new(tiers, DomainRouter::default());
        let levels: Vec<_> = escalator
            .plan("https://x.example")
            .iter()
            .map(|t| t.level())
            .collect();
        assert_eq!(levels, vec![TierLevel::Http, TierLevel::Managed]);
    }

    #[tokio::test]
    async fn hardened_plan_contains_only_managed() {
        let tiers: Vec<Arc<dyn ExtractionTier>> = vec![
            Arc::new(MockTier::new(TierLevel::Http, || ok("h"))),
            Arc::new(MockTier::new(TierLevel::Browser, || ok("b"))),
            Arc::new(MockTier::new(TierLevel::Managed, || ok("m"))),
        ];
        let escalator = ScrapeEscalator::new(tiers, DomainRouter::new(["wsj.com"]));
        let levels: Vec<_> = escalator
            .plan("https://www.wsj.com/articles/x")
            .iter()
            .map(|t| t.level())
            .collect();
        assert_eq!(levels, vec![TierLevel::Managed]);
    }
}
