//! Direct HTTP fetcher.
//!
//! The SAPL portal rejects clients that do not look like a browser, so every
//! request carries a desktop user-agent, browser accept headers and a referer
//! pointing at the target's own origin.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// Desktop browser identity.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en-US;q=0.7,en;q=0.5";

/// Fetches pages straight from the upstream site.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a browser-like identity and a 30s timeout.
    pub fn new() -> FetchResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE),
        );
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                source: Box::new(e),
            })?;

        Ok(Self { client })
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Parse an absolute http(s) URL.
pub fn validate_url(url: &str) -> FetchResult<Url> {
    match Url::parse(url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(parsed)
        }
        _ => Err(FetchError::InvalidUrl {
            url: url.to_string(),
        }),
    }
}

/// `scheme://host[:port]/` of a URL.
fn origin_referer(url: &Url) -> String {
    format!("{}/", url.origin().ascii_serialization())
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let target = validate_url(url)?;
        debug!(url = %target, "HTTP fetch starting");

        let response = self
            .client
            .get(target.clone())
            .header(header::REFERER, origin_referer(&target))
            .send()
            .await
            .map_err(|e| {
                warn!(url = %target, error = %e, "HTTP request failed");
                FetchError::Transport {
                    url: url.to_string(),
                    source: Box::new(e),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
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

        debug!(url = %target, content_length = body.len(), "Page fetched successfully");

        Ok(FetchedPage { body, content_type })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://sapl.camarabento.rs.gov.br/materia").is_ok());
        assert!(validate_url("http://localhost:8080/").is_ok());
        assert!(matches!(
            validate_url(""),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_url("/materia/pesquisar-materia"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_referer_is_origin() {
        let url = Url::parse("https://sapl.camarabento.rs.gov.br/materia/pesquisar-materia?page=2")
            .unwrap();
        assert_eq!(origin_referer(&url), "https://sapl.camarabento.rs.gov.br/");
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_request() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
