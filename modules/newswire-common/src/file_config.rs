use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::SourceDescriptor;

/// TOML-backed configuration loaded from disk.
/// Secrets stay as env vars. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub catalog: CatalogConfig,
    pub feed: FeedConfig,
    pub search: SearchConfig,
    pub scrape: ScrapeConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Replaces the built-in catalog when non-empty.
    pub sources: Vec<SourceDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub timeout_secs: u64,
    pub max_items: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_items: 15,
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub lookback_days: u32,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            max_results: 20,
            timeout_secs: 15,
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Escalation thresholds and per-tier caps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub http_timeout_secs: u64,
    pub http_max_chars: usize,
    /// Below this, Tier 1 output is treated as client-rendered and escalated.
    pub http_min_chars: usize,
    pub browser_timeout_secs: u64,
    pub browser_settle_ms: u64,
    pub browser_max_chars: usize,
    pub managed_timeout_secs: u64,
    pub managed_max_chars: usize,
    pub managed_min_chars: usize,
    /// Hosts (and their subdomains) that go straight to managed extraction.
    pub hardened_domains: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 10,
            http_max_chars: 2500,
            http_min_chars: 100,
            browser_timeout_secs: 20,
            browser_settle_ms: 2000,
            browser_max_chars: 3000,
            managed_timeout_secs: 180,
            managed_max_chars: 5000,
            managed_min_chars: 50,
            hardened_domains: [
                "fragrantica.com",
                "wsj.com",
                "bloomberg.com",
                "ft.com",
                "nytimes.com",
                "washingtonpost.com",
                "reuters.com",
                "economist.com",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl ScrapeConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_secs)
    }

    pub fn browser_settle(&self) -> Duration {
        Duration::from_millis(self.browser_settle_ms)
    }

    pub fn managed_timeout(&self) -> Duration {
        Duration::from_secs(self.managed_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub dir: PathBuf,
    pub file_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
            file_prefix: "news-briefing".to_string(),
        }
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    #[test]
    fn empty_file_yields_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.feed.max_items, 15);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.scrape.http_min_chars, 100);
        assert_eq!(config.scrape.managed_min_chars, 50);
        assert!(config.catalog.sources.is_empty());
    }

    #[test]
    fn partial_scrape_section_keeps_other_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [scrape]
            http_min_chars = 250
            hardened_domains = ["example.com"]
            "#,
        )
        .unwrap();
        assert_eq!(config.scrape.http_min_chars, 250);
        assert_eq!(config.scrape.http_max_chars, 2500);
        assert_eq!(config.scrape.hardened_domains, vec!["example.com"]);
    }

    #[test]
    fn catalog_sources_use_descriptor_shape() {
        let config: FileConfig = toml::from_str(
            r#"
            [[catalog.sources]]
            type = "feed"
            value = "https://example.com/feed.xml"
            label = "example"

            [[catalog.sources]]
            type = "search"
            value = "perfume launch"
            label = "news"
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog.sources.len(), 2);
        assert_eq!(config.catalog.sources[1].kind, SourceKind::Search);
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(toml::from_str::<FileConfig>("[bogus]\nx = 1").is_err());
    }

    #[test]
    fn load_config_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newswire.toml");
        std::fs::write(&path, "[search]\nlookback_days = 3\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.search.lookback_days, 3);
    }
}
