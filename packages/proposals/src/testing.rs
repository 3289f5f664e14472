//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the proposals library
//! without making real AI or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ClassifierError, ClassifierResult, FetchError, FetchResult};
use crate::traits::{
    backend::{ClassificationBackend, ClassificationRequest},
    fetcher::{FetchedPage, PageFetcher},
};

/// Canned outcome for a mocked URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Page(FetchedPage),
    NotFound,
    Status(u16),
    Network(String),
}

/// A mock fetcher with canned responses per URL.
///
/// URLs without a configured response answer `NotFound`.
#[derive(Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new mock fetcher with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve HTML for a URL.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let page = FetchedPage::new(html).with_content_type("text/html; charset=utf-8");
        self.with_response(url, MockResponse::Page(page))
    }

    /// Answer a URL with a transport failure.
    pub fn with_network_error(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_response(url, MockResponse::Network(message.into()))
    }

    /// Answer a URL with a non-success status.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.with_response(url, MockResponse::Status(status))
    }

    /// Configure any canned response.
    pub fn with_response(self, url: impl Into<String>, response: MockResponse) -> Self {
        self.responses.write().unwrap().insert(url.into(), response);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        let response = self.responses.read().unwrap().get(url).cloned();
        match response {
            Some(MockResponse::Page(page)) if page.body.trim().is_empty() => {
                Err(FetchError::EmptyBody { url: url.to_string() })
            }
            Some(MockResponse::Page(page)) => Ok(page),
            Some(MockResponse::Status(status)) => Err(FetchError::from_status(
                url,
                reqwest::StatusCode::from_u16(status)
                    .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            )),
            Some(MockResponse::Network(message)) => Err(FetchError::Transport {
                url: url.to_string(),
                source: message.into(),
            }),
            Some(MockResponse::NotFound) | None => Err(FetchError::NotFound {
                url: url.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Canned outcome for a mocked description.
#[derive(Debug, Clone)]
enum MockReply {
    Json(String),
    Fail(String),
}

/// Default reply for descriptions without a configured one.
pub const MOCK_DEFAULT_REPLY: &str = r#"{"category": "Outros", "locations": []}"#;

/// A mock classification backend.
///
/// Returns configured replies keyed by exact description, tracks every
/// request, and can simulate latency to exercise concurrency.
pub struct MockBackend {
    replies: Arc<RwLock<HashMap<String, MockReply>>>,
    default_reply: MockReply,
    latency: Option<Duration>,
    requests: Arc<RwLock<Vec<ClassificationRequest>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            replies: Arc::default(),
            default_reply: MockReply::Json(MOCK_DEFAULT_REPLY.to_string()),
            latency: None,
            requests: Arc::default(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl MockBackend {
    /// Create a mock answering every description with `Outros`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON reply for a description.
    pub fn with_reply(self, description: impl Into<String>, json: impl Into<String>) -> Self {
        self.replies
            .write()
            .unwrap()
            .insert(description.into(), MockReply::Json(json.into()));
        self
    }

    /// Backend error for a description.
    pub fn with_failure(self, description: impl Into<String>, message: impl Into<String>) -> Self {
        self.replies
            .write()
            .unwrap()
            .insert(description.into(), MockReply::Fail(message.into()));
        self
    }

    /// Reply used for unconfigured descriptions.
    pub fn with_default_reply(mut self, json: impl Into<String>) -> Self {
        self.default_reply = MockReply::Json(json.into());
        self
    }

    /// Fail every unconfigured description.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.default_reply = MockReply::Fail(message.into());
        self
    }

    /// Delay every reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    /// All requests received, in order.
    pub fn requests(&self) -> Vec<ClassificationRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Highest number of requests that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassificationBackend for MockBackend {
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String> {
        self.requests.write().unwrap().push(request.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let reply = self
            .replies
            .read()
            .unwrap()
            .get(&request.description)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            MockReply::Json(json) => Ok(json),
            MockReply::Fail(message) => Err(ClassifierError::Api(message)),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Builders for SAPL-style listing markup.
pub mod fixtures {
    /// One listing row.
    pub fn listing_row(id: &str, protocol: &str, ementa: &str, document_href: &str) -> String {
        format!(
            r#"<tr>
  <td>
    <b><a href="/materia/{slug}">{id}</a></b>
    <div>{protocol}</div>
  </td>
  <td>
    <p class="mb-0">
      <b>Autor:</b> Vereador Postal<br>
      <b>Ementa:</b> {ementa}<br>
      <span class="texto-original"><a href="{document_href}">Texto Original</a></span>
    </p>
  </td>
</tr>"#,
            slug = id.replace(['/', ' '], "-"),
        )
    }

    /// A valid IND row protocolled on `date`.
    pub fn proposal_row(number: u32, date: &str, ementa: &str) -> String {
        listing_row(
            &format!("IND {}/2024 - Indicação", number),
            &format!("Protocolo: {}/2024 de {} - 10:00", 1000 + number, date),
            ementa,
            &format!("/media/sapl/public/materialegislativa/2024/{}/ind.pdf", number),
        )
    }

    /// Wrap rows in the listing page structure.
    pub fn listing_page(rows: &[String]) -> String {
        format!(
            r#"<!DOCTYPE html>
<html><head><title>Pesquisar Matéria</title></head>
<body>
  <table class="table table-striped table-hover">
    <thead><tr><th>Matéria</th><th>Detalhes</th></tr></thead>
    <tbody>
{}
    </tbody>
  </table>
</body></html>"#,
            rows.join("\n")
        )
    }
}
