//! Page fetcher trait.
//!
//! The pipeline never talks HTTP itself. It asks a `PageFetcher` for a URL
//! and gets back the body text plus its content type, or a typed
//! `FetchError` that distinguishes "not found" from every other failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::FetchResult;

/// A fetched resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Response body as text
    pub body: String,

    /// Upstream `Content-Type`, if it sent one
    pub content_type: Option<String>,
}

impl FetchedPage {
    /// Create a page with no content type.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: None,
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Fetches listing pages.
///
/// Implementations:
/// - `HttpFetcher` - direct HTTP with a browser-like identity
/// - `RelayFetcher` - through a `/api/proxy?url=` relay
/// - `MockFetcher` - canned responses for tests
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch an absolute URL.
    ///
    /// Implementations must return `FetchError::NotFound` for a 404 and
    /// `FetchError::EmptyBody` when the body is blank.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    /// Short name for logging.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        (**self).fetch(url).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        (**self).fetch(url).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
