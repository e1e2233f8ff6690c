//! Blocking HTTP download of forge patches.

use tracing::info;

use crate::collaborators::ContentFetcher;
use crate::error::{FerrypickError, Result};

/// Fetches patches with a blocking `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("ferrypick/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FerrypickError::Fetch {
                url: String::new(),
                reason: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        info!(%url, "downloading patch");
        let to_error = |e: reqwest::Error| FerrypickError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(to_error)?;
        let bytes = response.bytes().map_err(to_error)?;
        Ok(bytes.to_vec())
    }
}
