// Tier 3: delegate to a managed extraction service (Apify) for markdown output.

use std::sync::Arc;
use std::time::Duration;

use apify_client::ApifyClient;
use async_trait::async_trait;
use newswire_common::{truncate_chars, ExtractionResult, ScrapeConfig};
use tracing::debug;

use super::tier::{require_min_chars, ExtractionTier, TierError, TierLevel};

/// Credential that enables this tier.
pub const CREDENTIAL: &str = "APIFY_API_TOKEN";

/// Page as returned by a managed extractor, before capping.
#[derive(Debug, Clone, Default)]
pub struct ManagedPage {
    pub title: Option<String>,
    pub body: String,
}

#[async_trait]
pub trait ManagedExtractor: Send + Sync {
    async fn extract_page(&self, url: &str) -> Result<ManagedPage, TierError>;
}

#[async_trait]
impl ManagedExtractor for ApifyClient {
    async fn extract_page(&self, url: &str) -> Result<ManagedPage, TierError> {
        let page = self
            .crawl_page(url)
            .await
            .map_err(|e| TierError::Provider(e.to_string()))?;
        Ok(ManagedPage {
            title: page.metadata.title.clone(),
            body: page.body().to_string(),
        })
    }
}

pub struct ManagedTier {
    extractor: Option<Arc<dyn ManagedExtractor>>,
    timeout: Duration,
    max_chars: usize,
    min_chars: usize,
}

impl ManagedTier {
    /// `None` disables the tier: every attempt fails with a missing-credential error.
    pub fn new(extractor: Option<Arc<dyn ManagedExtractor>>, config: &ScrapeConfig) -> Self {
        Self {
            extractor,
            timeout: config.managed_timeout(),
            max_chars: config.managed_max_chars,
            min_chars: config.managed_min_chars,
        }
    }

    pub fn from_token(token: Option<&str>, config: &ScrapeConfig) -> Self {
        let extractor = token
            .filter(|t| !t.is_empty())
            .map(|t| Arc::new(ApifyClient::new(t.to_string())) as Arc<dyn ManagedExtractor>);
        Self::new(extractor, config)
    }
}

#[async_trait]
impl ExtractionTier for ManagedTier {
    fn level(&self) -> TierLevel {
        TierLevel::Managed
    }

    async fn attempt(&self, url: &str) -> Result<ExtractionResult, TierError> {
        let Some(extractor) = &self.extractor else {
            return Err(TierError::MissingCredential(CREDENTIAL));
        };

        let page = tokio::time::timeout(self.timeout, extractor.extract_page(url))
            .await
            .map_err(|_| TierError::Timeout(self.timeout))??;

        let title = page
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| first_heading(&page.body))
            .unwrap_or_default();
        let content = truncate_chars(page.body.trim(), self.max_chars);
        debug!(url, chars = content.chars().count(), "managed tier: extracted");

        require_min_chars(ExtractionResult { title, content }, self.min_chars)
    }
}

/// First `# ` heading in a markdown body.
fn first_heading(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("# "))
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockManagedExtractor;

    #[tokio::test]
    async fn missing_credential_fails_without_calling_out() {
        let tier = ManagedTier::from_token(None, &ScrapeConfig::default());
        match tier.attempt("https://x.example").await {
            Err(TierError::MissingCredential(name)) => assert_eq!(name, "APIFY_API_TOKEN"),
            other => panic!("expected missing credential, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn markdown_heading_supplies_missing_title() {
        let body = format!("# Oud season\n\n{}", "Long paragraph. ".repeat(10));
        let extractor = MockManagedExtractor::returning(None, &body);
        let tier = ManagedTier::new(Some(Arc::new(extractor)), &ScrapeConfig::default());
        let result = tier.attempt("https://x.example").await.unwrap();
        assert_eq!(result.title, "Oud season");
        assert!(result.content.starts_with("# Oud season"));
    }

    #[tokio::test]
    async fn content_is_capped_and_gated() {
        let extractor = MockManagedExtractor::returning(Some("T"), &"a".repeat(9000));
        let tier = ManagedTier::new(Some(Arc::new(extractor)), &ScrapeConfig::default());
        assert_eq!(tier.attempt("https://x.example").await.unwrap().content.len(), 5000);

        let thin = MockManagedExtractor::returning(Some("T"), "too short");
        let tier = ManagedTier::new(Some(Arc::new(thin)), &ScrapeConfig::default());
        assert!(matches!(
            tier.attempt("https://x.example").await,
            Err(TierError::InsufficientContent { got: 9, min: 50 })
        ));
    }

    #[test]
    fn heading_search_skips_subheadings() {
        assert_eq!(first_heading("## sub\n# Main\n"), Some("Main".to_string()));
        assert_eq!(first_heading("no headings"), None);
    }
}
