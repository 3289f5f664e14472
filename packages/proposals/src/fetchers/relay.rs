//! Fetcher that goes through the fetch relay.
//!
//! The relay answers `GET {relay}/api/proxy?url=<target>` with the target's
//! body and content type, or with the target's failing status. A 404 from
//! the relay therefore means the target page does not exist.

use async_trait::async_trait;
use reqwest::header;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

use super::http::validate_url;

/// Path the relay serves.
pub const RELAY_PATH: &str = "/api/proxy";

/// Fetches pages via a relay endpoint.
pub struct RelayFetcher {
    client: reqwest::Client,
    relay_url: Url,
}

impl RelayFetcher {
    /// Create a fetcher for a relay at `relay_url` (scheme + host, any path
    /// is replaced by [`RELAY_PATH`]).
    pub fn new(relay_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url,
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Relay URL that fetches `target`.
    pub fn proxy_url(&self, target: &str) -> Url {
        let mut url = self.relay_url.clone();
        url.set_path(RELAY_PATH);
        url.query_pairs_mut().clear().append_pair("url", target);
        url
    }
}

#[async_trait]
impl PageFetcher for RelayFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        validate_url(url)?;
        let proxy_url = self.proxy_url(url);
        debug!(url = %url, relay = %self.relay_url, "Relay fetch starting");

        let response = self
            .client
            .get(proxy_url)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Relay request failed");
                FetchError::Transport {
                    url: url.to_string(),
                    source: Box::new(e),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, detail = %detail, "Relay returned an error");
            return Err(FetchError::from_status(url, status));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(FetchedPage { body, content_type })
    }

    fn name(&self) -> &str {
        "relay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_url_encodes_target() {
        let fetcher = RelayFetcher::new(Url::parse("http://localhost:3000/ignored").unwrap());

        let url = fetcher.proxy_url("https://sapl.example.gov.br/materia?page=2&tipo=8");

        assert_eq!(url.path(), "/api/proxy");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "url");
        assert_eq!(value, "https://sapl.example.gov.br/materia?page=2&tipo=8");
        assert!(!url.as_str().contains("&tipo"));
    }

    #[tokio::test]
    async fn test_rejects_relative_target() {
        let fetcher = RelayFetcher::new(Url::parse("http://localhost:3000").unwrap());
        let err = fetcher.fetch("/materia").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
