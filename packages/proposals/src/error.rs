//! Typed errors for the proposals library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Fatal pipeline failures.
///
/// Only failures at the page level surface here. Malformed rows and
/// classification failures are recovered locally and never reach the caller.
/// The messages are user-facing and written in the source portal's locale.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The mandatory first listing page could not be fetched.
    #[error(
        "Falha ao carregar dados principais do portal da câmara. \
         O serviço pode estar indisponível. Detalhes: {0}"
    )]
    PrimarySourceUnavailable(#[source] FetchError),

    /// Both pages were fetched but no proposal survived extraction.
    #[error(
        "Nenhuma indicação foi encontrada para processar. O site de origem pode ter \
         mudado sua estrutura ou está temporariamente bloqueando o acesso automatizado."
    )]
    NoProposalsFound,
}

/// Errors that can occur while fetching a listing page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL missing, unparsable, or not http(s)
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Upstream answered 404
    #[error("404 Not Found: {url}")]
    NotFound { url: String },

    /// Upstream answered with any other non-success status
    #[error("HTTP {status} {reason} for {url}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    /// Connection, TLS, timeout or body read failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Upstream answered successfully with nothing in the body
    #[error("empty response body from {url}")]
    EmptyBody { url: String },
}

impl FetchError {
    /// Map a non-success upstream status to the matching error.
    pub fn from_status(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        let url = url.into();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Self::NotFound { url };
        }
        Self::Status {
            url,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// Whether the upstream reported the page as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while talking to the classification backend.
///
/// The classifier adapter swallows all of these into a fallback result.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error: {0}")]
    Api(String),

    /// Response did not match the requested schema
    #[error("invalid reply: {0}")]
    InvalidReply(String),

    /// Concurrency limiter was shut down
    #[error("classifier is shutting down")]
    Closed,
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidReply(err.to_string())
    }
}

/// Result type alias for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for page fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for classification backend calls.
pub type ClassifierResult<T> = std::result::Result<T, ClassifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_distinguishes_not_found() {
        let err = FetchError::from_status("https://example.com/p2", reqwest::StatusCode::NOT_FOUND);
        assert!(err.is_not_found());

        let err = FetchError::from_status(
            "https://example.com/p2",
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
        );
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "HTTP 503 Service Unavailable for https://example.com/p2"
        );
    }

    #[test]
    fn test_primary_failure_message_mentions_source() {
        let err = PipelineError::PrimarySourceUnavailable(FetchError::NotFound {
            url: "https://example.com".into(),
        });
        let message = err.to_string();
        assert!(message.contains("dados principais"));
        assert!(message.contains("404 Not Found"));
    }
}
