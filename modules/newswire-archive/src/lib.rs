pub mod archive;
pub mod browser;
pub mod catalog;
pub mod dedup;
pub mod pipeline;
pub mod readability;
pub mod scrape;
pub mod services;
pub mod suggest;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use archive::Archive;
pub use browser::{BrowserlessLauncher, SharedBrowser};
pub use catalog::SourceCatalog;
pub use dedup::{dedupe, fingerprint};
pub use pipeline::Gatherer;
pub use scrape::{ExtractionFailure, ScrapeEscalator};
pub use suggest::{FileSuggester, SourceSuggester};
pub use traits::ContentFetcher;
