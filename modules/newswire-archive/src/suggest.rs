// Source discovery collaborator seam.
//
// A suggester proposes extra descriptors in the shared `{type, value, label}`
// shape. Malformed entries are dropped one by one, and the list is capped.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use newswire_common::SourceDescriptor;
use tracing::debug;

/// Most suggestions accepted from one proposal.
pub const MAX_SUGGESTIONS: usize = 5;

#[async_trait]
pub trait SourceSuggester: Send + Sync {
    /// Propose additional sources given the current catalog.
    async fn suggest(&self, existing: &[SourceDescriptor]) -> Result<Vec<SourceDescriptor>>;
}

/// Parse a suggestion payload: a JSON array of descriptors.
/// Entries that do not match the shape are skipped. At most [`MAX_SUGGESTIONS`] are kept.
pub fn parse_suggestions(json: &str) -> Result<Vec<SourceDescriptor>> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(json).context("Suggestion payload is not a JSON array")?;

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<SourceDescriptor>(entry) {
            Ok(d) => Some(d),
            Err(e) => {
                debug!(error = %e, "suggest: skipping malformed entry");
                None
            }
        })
        .take(MAX_SUGGESTIONS)
        .collect())
}

/// Reads a suggestion payload from a JSON file.
pub struct FileSuggester {
    path: PathBuf,
}

impl FileSuggester {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceSuggester for FileSuggester {
    async fn suggest(&self, _existing: &[SourceDescriptor]) -> Result<Vec<SourceDescriptor>> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read suggestions: {}", self.path.display()))?;
        parse_suggestions(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newswire_common::SourceKind;

    #[test]
    fn parses_and_caps() {
        let entries: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"type":"feed","value":"https://f{i}.example/rss","label":"f{i}"}}"#))
            .collect();
        let json = format!("[{}]", entries.join(","));
        let parsed = parse_suggestions(&json).unwrap();
        assert_eq!(parsed.len(), MAX_SUGGESTIONS);
        assert_eq!(parsed[0].label, "f0");
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let json = r#"[
            {"type":"scrape","value":"https://a.example","label":"a"},
            {"type":"podcast","value":"x","label":"bad kind"},
            {"value":"missing type","label":"b"},
            {"type":"search","value":"perfume launch","label":"c"}
        ]"#;
        let parsed = parse_suggestions(json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].kind, SourceKind::Search);
    }

    #[test]
    fn non_array_payload_is_an_error() {
        assert!(parse_suggestions(r#"{"type":"feed"}"#).is_err());
    }

    #[tokio::test]
    async fn file_suggester_reads_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suggestions.json");
        std::fs::write(&path, r#"[{"type":"feed","value":"basenotes","label":"bn"}]"#).unwrap();
        let suggested = FileSuggester::new(&path).suggest(&[]).await.unwrap();
        assert_eq!(suggested, vec![SourceDescriptor::feed("basenotes", "bn")]);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let suggester = FileSuggester::new("/nonexistent/suggestions.json");
        assert!(suggester.suggest(&[]).await.is_err());
    }
}
