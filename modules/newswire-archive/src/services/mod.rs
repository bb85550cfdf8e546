// Source-kind services: feeds and news search.

pub mod feed;
pub mod search;

pub use feed::FeedFetcher;
pub use search::SearchFetcher;
