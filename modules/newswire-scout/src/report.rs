// Report writer: persists the final text blob handed over by the run.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use newswire_common::ReportConfig;
use serde::Serialize;
use tracing::{info, warn};

/// What the writer hands back: `{success, path, filename}` or `{error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportOutcome {
    Written {
        success: bool,
        path: String,
        filename: String,
    },
    Failed {
        error: String,
    },
}

impl ReportOutcome {
    fn written(path: &Path, filename: String) -> Self {
        Self::Written {
            success: true,
            path: path.display().to_string(),
            filename,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }
}

#[async_trait]
pub trait ReportWriter: Send + Sync {
    async fn write(&self, content: &str) -> ReportOutcome;
}

/// Writes `<dir>/<prefix>-<YYYY-MM-DD>.md`, creating `dir` as needed.
/// A second write on the same day overwrites the first.
pub struct MarkdownReportWriter {
    dir: PathBuf,
    prefix: String,
}

impl MarkdownReportWriter {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            prefix: config.file_prefix.clone(),
        }
    }

    pub fn filename_for(&self, date: NaiveDate) -> String {
        format!("{}-{}.md", self.prefix, date.format("%Y-%m-%d"))
    }

    pub async fn write_dated(&self, content: &str, date: NaiveDate) -> ReportOutcome {
        if content.trim().is_empty() {
            return ReportOutcome::failed("No content provided for the report");
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "report: cannot create directory");
            return ReportOutcome::failed(format!(
                "Failed to create {}: {e}",
                self.dir.display()
            ));
        }

        let filename = self.filename_for(date);
        let path = self.dir.join(&filename);
        match tokio::fs::write(&path, content).await {
            Ok(()) => {
                info!(path = %path.display(), bytes = content.len(), "report: written");
                ReportOutcome::written(&path, filename)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "report: write failed");
                ReportOutcome::failed(format!("Failed to write {}: {e}", path.display()))
            }
        }
    }
}

#[async_trait]
impl ReportWriter for MarkdownReportWriter {
    async fn write(&self, content: &str) -> ReportOutcome {
        self.write_dated(content, Utc::now().date_naive()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(dir: &Path) -> MarkdownReportWriter {
        MarkdownReportWriter::new(&ReportConfig {
            dir: dir.join("reports"),
            file_prefix: "news-briefing".into(),
        })
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn writes_dated_file_and_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = writer(tmp.path()).write_dated("# Digest\n", june_first()).await;

        let expected = tmp.path().join("reports").join("news-briefing-2025-06-01.md");
        assert_eq!(
            outcome,
            ReportOutcome::Written {
                success: true,
                path: expected.display().to_string(),
                filename: "news-briefing-2025-06-01.md".into(),
            }
        );
        assert_eq!(std::fs::read_to_string(expected).unwrap(), "# Digest\n");
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let outcome = writer(tmp.path()).write_dated("  \n", june_first()).await;
        assert!(matches!(outcome, ReportOutcome::Failed { .. }));
        assert!(!tmp.path().join("reports").exists());
    }

    #[tokio::test]
    async fn unwritable_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("reports");
        std::fs::write(&blocker, "not a directory").unwrap();
        let outcome = writer(tmp.path()).write_dated("content", june_first()).await;
        assert!(matches!(outcome, ReportOutcome::Failed { .. }));
    }

    #[test]
    fn outcome_serializes_in_collaborator_shape() {
        let ok = serde_json::to_value(ReportOutcome::Written {
            success: true,
            path: "/tmp/r.md".into(),
            filename: "r.md".into(),
        })
        .unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["filename"], "r.md");

        let err = serde_json::to_value(ReportOutcome::failed("disk full")).unwrap();
        assert_eq!(err, serde_json::json!({"error": "disk full"}));
    }
}
