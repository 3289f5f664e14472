//! Classification backend implementations.
//!
//! - `OpenAIBackend` - structured outputs via OpenAI (requires `openai` feature)
//! - `RateLimitedBackend` - governor quota around any backend
//! - `MockBackend` (in [`crate::testing`]) - for tests

mod rate_limited;

#[cfg(feature = "openai")]
mod openai;

pub use rate_limited::{BackendExt, RateLimitedBackend};

#[cfg(feature = "openai")]
pub use openai::OpenAIBackend;

// Re-export from traits for convenience
pub use crate::traits::backend::{ClassificationBackend, ClassificationRequest};
