//! NAIP Scraper Library
//!
//! This library provides the core functionality for the `naip-scraper` CLI:
//! discovering NAIP imagery archives on the USDA NRCS Box folder by year and
//! US state, downloading them, and optionally extracting the zip archives.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::core::scraper::{FetchOptions, NaipScraper};
