//! Cache-backed classifier adapter.
//!
//! `Classifier::classify` never fails from the caller's point of view: any
//! backend error, malformed reply or schema violation becomes the fallback
//! result (catch-all category, no locations). Every outcome is cached, so a
//! description reaches the backend at most once per cache lifetime.
//!
//! Backend calls are bounded by a semaphore; concurrent requests for the same
//! uncached description share a single call through the cache.

pub mod prompts;
pub mod schema;

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::cache::ClassificationCache;
use crate::error::{ClassifierError, ClassifierResult};
use crate::traits::backend::ClassificationBackend;
use crate::types::config::DEFAULT_MAX_CONCURRENT_CLASSIFICATIONS;
use crate::types::proposal::ClassificationResult;

pub use prompts::{classification_request, format_classify_prompt, CLASSIFY_PROMPT};
pub use schema::{classification_schema, parse_reply, ClassificationReply};

/// Classifies ementas through a backend, memoizing every outcome.
pub struct Classifier<B: ClassificationBackend> {
    backend: B,
    cache: Arc<ClassificationCache>,
    permits: Arc<Semaphore>,
}

impl<B: ClassificationBackend> Classifier<B> {
    /// Create a classifier with its own empty cache.
    pub fn new(backend: B) -> Self {
        Self::with_cache(backend, Arc::new(ClassificationCache::new()))
    }

    /// Create a classifier sharing an existing cache.
    pub fn with_cache(backend: B, cache: Arc<ClassificationCache>) -> Self {
        Self {
            backend,
            cache,
            permits: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_CLASSIFICATIONS)),
        }
    }

    /// Bound the number of backend calls in flight. Zero is treated as one.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(max.max(1)));
        self
    }

    /// The cache backing this classifier.
    pub fn cache(&self) -> &Arc<ClassificationCache> {
        &self.cache
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Classify one description.
    pub async fn classify(&self, description: &str) -> ClassificationResult {
        if let Some(hit) = self.cache.get(description) {
            debug!(description_len = description.len(), "Classification cache hit");
            return hit;
        }

        self.cache
            .get_or_insert_with(description, || self.classify_uncached(description))
            .await
    }

    async fn classify_uncached(&self, description: &str) -> ClassificationResult {
        match self.request(description).await {
            Ok(result) => {
                debug!(
                    backend = self.backend.name(),
                    category = %result.category,
                    locations = result.locations.len(),
                    "Classified description"
                );
                result
            }
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    error = %e,
                    "Classification failed, using fallback"
                );
                ClassificationResult::fallback()
            }
        }
    }

    async fn request(&self, description: &str) -> ClassifierResult<ClassificationResult> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ClassifierError::Closed)?;

        let request = classification_request(description);
        let raw = self.backend.complete(&request).await?;
        parse_reply(&raw)
    }
}
