//! OpenAI implementation of the classification backend.
//!
//! Sends one chat completion per request with a strict `json_schema`
//! response format, so the reply is JSON matching the taxonomy schema.
//!
//! # Example
//!
//! ```rust,ignore
//! use proposals::backends::OpenAIBackend;
//!
//! let backend = OpenAIBackend::from_env()?.with_model("gpt-4o-mini");
//! let classifier = Classifier::new(backend);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ClassifierError, ClassifierResult};
use crate::security::SecretString;
use crate::traits::backend::{ClassificationBackend, ClassificationRequest};

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str =
    "Você classifica indicações legislativas municipais e responde apenas com JSON.";

/// OpenAI structured-output backend.
#[derive(Clone)]
pub struct OpenAIBackend {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAIBackend {
    /// Create a new backend with the given API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> ClassifierResult<Self> {
        let api_key = SecretString::from_env("OPENAI_API_KEY")
            .ok_or_else(|| ClassifierError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o-mini).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &ClassificationRequest) -> StructuredRequest {
        StructuredRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.instruction.clone(),
                },
            ],
            temperature: request.temperature,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: "proposal_classification".to_string(),
                    strict: true,
                    schema: request.schema.clone(),
                },
            },
        }
    }
}

#[async_trait]
impl ClassificationBackend for OpenAIBackend {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose())
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                ClassifierError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(ClassifierError::Api(format!(
                "OpenAI structured output error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidReply(e.to_string()))?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI classification completed"
        );

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifierError::InvalidReply("No content in OpenAI response".into()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct StructuredRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    /// Null when the model refuses
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classification_request;

    #[test]
    fn test_builder() {
        let backend = OpenAIBackend::new("sk-test")
            .with_model("gpt-4o")
            .with_base_url("https://custom.api.com/v1/");

        assert_eq!(backend.model(), "gpt-4o");
        assert_eq!(backend.base_url, "https://custom.api.com/v1");
        assert_eq!(backend.name(), "openai");
    }

    #[test]
    fn test_request_body_shape() {
        let backend = OpenAIBackend::new("sk-test");
        let body =
            serde_json::to_value(backend.build_request(&classification_request("Ementa"))).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["messages"][1]["role"], "user");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Ementa: \"Ementa\""));
    }

    #[test]
    fn test_api_key_not_in_debug() {
        let backend = OpenAIBackend::new("sk-secret");
        assert!(!format!("{:?}", backend.api_key).contains("sk-secret"));
    }
}
