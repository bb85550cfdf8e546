pub mod config;
pub mod error;
pub mod file_config;
pub mod types;

pub use config::AppConfig;
pub use error::NewswireError;
pub use file_config::{
    load_config, CatalogConfig, FeedConfig, FileConfig, ReportConfig, ScrapeConfig, SearchConfig,
};
pub use types::*;
