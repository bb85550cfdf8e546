use std::collections::HashSet;

use newswire_common::{CatalogConfig, SourceDescriptor};
use tracing::{debug, info, warn};

use crate::suggest::{SourceSuggester, MAX_SUGGESTIONS};

/// Ordered list of sources for one run.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    sources: Vec<SourceDescriptor>,
}

impl SourceCatalog {
    pub fn new(sources: Vec<SourceDescriptor>) -> Self {
        Self { sources }
    }

    /// Built-in sources used when the config file names none.
    pub fn default_catalog() -> Self {
        Self::new(vec![
            SourceDescriptor::feed(
                "https://allgoodscents.com/blogs/all-good-notes.atom",
                "allgoodscents",
            ),
            SourceDescriptor::search("site:fragrantica.com perfume news", "fragrantica"),
            SourceDescriptor::search("perfume OR fragrance OR perfumery new launch", "news"),
        ])
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        if config.sources.is_empty() {
            Self::default_catalog()
        } else {
            Self::new(config.sources.clone())
        }
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Append descriptors in order, skipping any whose identity is already present.
    /// Returns how many were added.
    pub fn extend(&mut self, candidates: Vec<SourceDescriptor>) -> usize {
        let mut seen: HashSet<_> = self.sources.iter().map(SourceDescriptor::identity).collect();
        let before = self.sources.len();
        for candidate in candidates {
            if seen.insert(candidate.identity()) {
                self.sources.push(candidate);
            } else {
                debug!(
                    kind = %candidate.kind,
                    locator = candidate.locator.as_str(),
                    "catalog: skipping duplicate suggestion"
                );
            }
        }
        self.sources.len() - before
    }

    /// Ask a suggester for more sources. Any suggester error leaves the catalog as is.
    pub async fn extend_from(&mut self, suggester: &dyn SourceSuggester) -> usize {
        match suggester.suggest(&self.sources).await {
            Ok(mut suggested) => {
                suggested.truncate(MAX_SUGGESTIONS);
                let proposed = suggested.len();
                let added = self.extend(suggested);
                info!(
                    proposed,
                    added,
                    total = self.sources.len(),
                    "catalog: extended with suggestions"
                );
                added
            }
            Err(e) => {
                warn!(error = %e, "catalog: suggestion failed, continuing with base catalog");
                0
            }
        }
    }
}
