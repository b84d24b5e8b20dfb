use crate::error::{NaipError, Result};
use reqwest::blocking::Client;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("naip-scraper/", env!("CARGO_PKG_VERSION"));

/// Fetches a Box listing page and returns its raw HTML.
///
/// The catalog is generic over this trait so tests can run against fixture
/// pages instead of the live Box folder.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(NaipError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text()?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Fixture-backed fetcher mapping URLs to canned pages, recording hits.
    pub(crate) struct FixtureFetcher {
        pages: HashMap<String, String>,
        pub(crate) hits: RefCell<Vec<String>>,
    }

    impl FixtureFetcher {
        pub(crate) fn new(pages: Vec<(String, String)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                hits: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageFetcher for FixtureFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            self.hits.borrow_mut().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| NaipError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }
}
