//! Page fetcher implementations.
//!
//! - `HttpFetcher` - direct HTTP with a browser-like identity
//! - `RelayFetcher` - through the `/api/proxy` relay
//! - `MockFetcher` (in [`crate::testing`]) - for tests

mod http;
mod relay;

pub use http::{validate_url, HttpFetcher, BROWSER_USER_AGENT};
pub use relay::{RelayFetcher, RELAY_PATH};

// Re-export from traits for convenience
pub use crate::traits::fetcher::{FetchedPage, PageFetcher};
