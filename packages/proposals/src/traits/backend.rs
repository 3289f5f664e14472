//! Classification backend trait.
//!
//! The backend is the opaque, fallible, slow AI capability that turns an
//! instruction plus an output schema into JSON text. Validation of that text
//! is the classifier's job, not the backend's.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ClassifierResult;

/// One structured-output request.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    /// The ementa being classified
    pub description: String,

    /// Natural-language instruction embedding the description
    pub instruction: String,

    /// JSON schema the reply must match
    pub schema: serde_json::Value,

    /// Sampling temperature (always 0 for classification)
    pub temperature: f32,
}

/// External structured-output capability.
#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    /// Run the request and return the raw JSON reply.
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String>;

    /// Short name for logging.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ClassificationBackend + ?Sized> ClassificationBackend for Box<T> {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: ClassificationBackend + ?Sized> ClassificationBackend for Arc<T> {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
