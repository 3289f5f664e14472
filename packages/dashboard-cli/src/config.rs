use anyhow::{Context, Result};
use dotenvy::dotenv;
use proposals::security::SecretString;
use std::env;
use std::num::NonZeroU32;
use url::Url;

/// Settings loaded from environment variables (and `.env` when present).
///
/// Command-line flags override these.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<SecretString>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub relay_url: Option<Url>,
    pub max_concurrency: Option<usize>,
    pub requests_per_second: Option<NonZeroU32>,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            openai_api_key: SecretString::from_env("OPENAI_API_KEY"),
            openai_model: optional("OPENAI_MODEL"),
            openai_base_url: optional("OPENAI_BASE_URL"),
            relay_url: optional("PROPOSALS_RELAY_URL")
                .map(|v| Url::parse(&v))
                .transpose()
                .context("PROPOSALS_RELAY_URL must be an absolute URL")?,
            max_concurrency: optional("PROPOSALS_MAX_CONCURRENCY")
                .map(|v| v.parse())
                .transpose()
                .context("PROPOSALS_MAX_CONCURRENCY must be a positive number")?,
            requests_per_second: optional("PROPOSALS_REQUESTS_PER_SECOND")
                .map(|v| v.parse())
                .transpose()
                .context("PROPOSALS_REQUESTS_PER_SECOND must be a positive number")?,
            port: optional("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
        })
    }
}

/// Unset and blank are the same.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
