//! Core trait abstractions.
//!
//! - [`fetcher::PageFetcher`] - retrieves listing pages (direct or via relay)
//! - [`backend::ClassificationBackend`] - the external classification capability

pub mod backend;
pub mod fetcher;
