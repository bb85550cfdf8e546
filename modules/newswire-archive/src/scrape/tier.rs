use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use newswire_common::ExtractionResult;

/// Position of a strategy in the escalation ladder, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierLevel {
    Http = 1,
    Browser = 2,
    Managed = 3,
}

impl TierLevel {
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Browser => "browser",
            Self::Managed => "managed",
        }
    }
}

impl fmt::Display for TierLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {} ({})", self.number(), self.name())
    }
}

/// Why one tier gave up on a URL. Recoverable by escalation.
#[derive(Debug, thiserror::Error)]
pub enum TierError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("insufficient content: {got} chars (minimum {min})")]
    InsufficientContent { got: usize, min: usize },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0} not set")]
    MissingCredential(&'static str),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("browser error: {0}")]
    Browser(String),
}

impl From<reqwest::Error> for TierError {
    fn from(err: reqwest::Error) -> Self {
        TierError::Transport(err.to_string())
    }
}

/// One extraction strategy. Implementations never panic on bad pages;
/// every problem is a `TierError`.
#[async_trait]
pub trait ExtractionTier: Send + Sync {
    fn level(&self) -> TierLevel;

    async fn attempt(&self, url: &str) -> Result<ExtractionResult, TierError>;
}

/// Gate a result on a minimum content length.
pub(crate) fn require_min_chars(
    result: ExtractionResult,
    min: usize,
) -> Result<ExtractionResult, TierError> {
    let got = result.content_chars();
    if got < min {
        return Err(TierError::InsufficientContent { got, min });
    }
    Ok(result)
}
