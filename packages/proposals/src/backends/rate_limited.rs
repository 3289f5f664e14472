//! Rate-limited backend wrapper.
//!
//! Wraps any ClassificationBackend with a request quota using the governor crate.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::ClassifierResult;
use crate::traits::backend::{ClassificationBackend, ClassificationRequest};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A backend wrapper that enforces a sustained request rate.
pub struct RateLimitedBackend<B: ClassificationBackend> {
    inner: B,
    limiter: Arc<DefaultRateLimiter>,
}

impl<B: ClassificationBackend> RateLimitedBackend<B> {
    /// Limit `backend` to `requests_per_second`.
    pub fn new(backend: B, requests_per_second: NonZeroU32) -> Self {
        Self::with_quota(backend, Quota::per_second(requests_per_second))
    }

    /// Limit with burst support.
    pub fn with_burst(backend: B, requests_per_second: NonZeroU32, burst: NonZeroU32) -> Self {
        Self::with_quota(
            backend,
            Quota::per_second(requests_per_second).allow_burst(burst),
        )
    }

    /// Limit with a custom quota.
    pub fn with_quota(backend: B, quota: Quota) -> Self {
        Self {
            inner: backend,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: ClassificationBackend> ClassificationBackend for RateLimitedBackend<B> {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
        self.limiter.until_ready().await;
        self.inner.complete(request).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Extension trait for easy rate limiting.
pub trait BackendExt: ClassificationBackend + Sized {
    /// Wrap this backend with rate limiting.
    fn rate_limited(self, requests_per_second: NonZeroU32) -> RateLimitedBackend<Self> {
        RateLimitedBackend::new(self, requests_per_second)
    }
}

impl<B: ClassificationBackend + Sized> BackendExt for B {}
