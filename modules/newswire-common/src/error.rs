use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewswireError {
    #[error("Source fetch failed for {source_label}: {reason}")]
    SourceFetch { source_label: String, reason: String },

    #[error("{tier} failed: {reason}")]
    Extraction { tier: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No articles gathered from any source")]
    NoArticles,

    #[error("Report write failed: {0}")]
    ReportWrite(String),
}

impl NewswireError {
    /// Whether this error ends the run rather than being recorded and skipped.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, Self::NoArticles | Self::ReportWrite(_))
    }
}
