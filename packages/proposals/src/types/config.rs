//! Configuration for the proposal pipeline.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use url::Url;

/// Origin of the Câmara de Bento Gonçalves SAPL portal.
pub const DEFAULT_BASE_URL: &str = "https://sapl.camarabento.rs.gov.br";

/// Search query for IND proposals of 2024 authored by the tracked councillor.
const DEFAULT_SEARCH_QUERY: &str = "tipo=8&ementa=&numero=&numeracao__numero_materia=\
&numero_protocolo=&ano=2024&autoria__autor=400&autoria__primeiro_autor=unknown\
&autoria__autor__tipo=&autoria__autor__parlamentar_set__filiacao__partido=&o=\
&tipo_listagem=1&tipo_origem_externa=&numero_origem_externa=&ano_origem_externa=\
&data_origem_externa_0=&data_origem_externa_1=&local_origem_externa=\
&data_apresentacao_0=&data_apresentacao_1=&data_publicacao_0=&data_publicacao_1=\
&relatoria__parlamentar_id=&em_tramitacao=&tramitacao__unidade_tramitacao_destino=\
&tramitacao__status=&materiaassunto__assunto=&indexacao=&regime_tramitacao=";

/// Default bound on in-flight classification calls.
pub const DEFAULT_MAX_CONCURRENT_CLASSIFICATIONS: usize = 8;

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base used to resolve relative document links.
    pub base_url: Url,

    /// First listing page. Mandatory: failing to fetch it aborts the run.
    pub primary_page_url: String,

    /// Second listing page. Optional: failures degrade to page one only.
    pub secondary_page_url: String,

    /// Maximum classification calls in flight at once.
    ///
    /// Default: 8. Zero is treated as one.
    pub max_concurrent_classifications: usize,

    /// Sustained classification request rate, if the backend is throttled.
    ///
    /// Default: None (no quota).
    pub requests_per_second: Option<NonZeroU32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid");
        Self {
            primary_page_url: search_page_url(DEFAULT_BASE_URL, 1),
            secondary_page_url: search_page_url(DEFAULT_BASE_URL, 2),
            base_url,
            max_concurrent_classifications: DEFAULT_MAX_CONCURRENT_CLASSIFICATIONS,
            requests_per_second: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the pipeline at explicit page URLs.
    pub fn with_pages(
        mut self,
        primary_page_url: impl Into<String>,
        secondary_page_url: impl Into<String>,
    ) -> Self {
        self.primary_page_url = primary_page_url.into();
        self.secondary_page_url = secondary_page_url.into();
        self
    }

    /// Set the base used for document links.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the classification fan-out bound.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrent_classifications = max;
        self
    }

    /// Throttle classification calls to a sustained rate.
    pub fn with_requests_per_second(mut self, rps: NonZeroU32) -> Self {
        self.requests_per_second = Some(rps);
        self
    }
}

/// Build the SAPL search URL for a given result page.
///
/// Page one carries no `page` parameter, as the portal links it.
pub fn search_page_url(base_url: &str, page: u32) -> String {
    let base = base_url.trim_end_matches('/');
    if page <= 1 {
        format!("{}/materia/pesquisar-materia?{}", base, DEFAULT_SEARCH_QUERY)
    } else {
        format!(
            "{}/materia/pesquisar-materia?page={}&{}",
            base, page, DEFAULT_SEARCH_QUERY
        )
    }
}
