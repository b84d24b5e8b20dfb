pub mod catalog;
pub mod download;
pub mod fetch;
pub mod listing;
pub mod progress;
pub mod scraper;
pub mod states;
