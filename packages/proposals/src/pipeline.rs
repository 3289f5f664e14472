//! End-to-end proposal pipeline.
//!
//! fetch page 1 (mandatory) → fetch page 2 (optional) → extract rows →
//! dedupe by id → classify concurrently → sort by protocol date.
//!
//! Only two failures reach the caller, both as [`PipelineError`]: the first
//! page being unreachable, and no proposal surviving extraction. Everything
//! past extraction recovers locally.

use futures::future::join_all;
use indexmap::IndexMap;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::backends::RateLimitedBackend;
use crate::classifier::Classifier;
use crate::error::{PipelineError, Result};
use crate::extractor::parse_proposals;
use crate::traits::backend::ClassificationBackend;
use crate::traits::fetcher::PageFetcher;
use crate::types::config::PipelineConfig;
use crate::types::proposal::{sort_by_protocol_date, ClassifiedProposal, RawProposal};

/// Fetches, classifies and orders the proposals of the configured listing.
///
/// The classifier (and its cache) lives as long as the pipeline, so repeated
/// `run()` calls on one pipeline reuse every earlier classification.
pub struct Pipeline<F: PageFetcher, B: ClassificationBackend> {
    fetcher: F,
    classifier: Classifier<B>,
    config: PipelineConfig,
}

impl<F: PageFetcher, B: ClassificationBackend> Pipeline<F, B> {
    /// Create a pipeline with a fresh classifier bounded by the config.
    pub fn new(fetcher: F, backend: B, config: PipelineConfig) -> Self {
        let classifier =
            Classifier::new(backend).with_max_concurrency(config.max_concurrent_classifications);
        Self::with_classifier(fetcher, classifier, config)
    }

    /// Create a pipeline around an existing classifier (e.g. one sharing a cache).
    pub fn with_classifier(fetcher: F, classifier: Classifier<B>, config: PipelineConfig) -> Self {
        Self {
            fetcher,
            classifier,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier<B> {
        &self.classifier
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Run the pipeline once.
    pub async fn run(&self) -> Result<Vec<ClassifiedProposal>> {
        let start = Instant::now();
        info!(
            fetcher = self.fetcher.name(),
            backend = self.classifier.backend().name(),
            "Starting proposal pipeline"
        );

        let primary_markup = self.fetch_primary().await?;
        let secondary_markup = self.fetch_secondary().await;

        let mut raw = parse_proposals(&primary_markup, &self.config.base_url);
        let primary_count = raw.len();
        raw.extend(parse_proposals(&secondary_markup, &self.config.base_url));
        info!(
            primary = primary_count,
            secondary = raw.len() - primary_count,
            "Extracted proposal rows"
        );

        let unique = dedupe_by_id(raw);
        if unique.is_empty() {
            error!("No proposals survived extraction");
            return Err(PipelineError::NoProposalsFound);
        }

        let mut proposals = join_all(unique.into_iter().map(|proposal| async move {
            let result = self.classifier.classify(&proposal.description).await;
            proposal.classify(result)
        }))
        .await;

        sort_by_protocol_date(&mut proposals);

        info!(
            proposals = proposals.len(),
            cached = self.classifier.cache().len(),
            duration_ms = start.elapsed().as_millis(),
            "Proposal pipeline completed"
        );

        Ok(proposals)
    }

    async fn fetch_primary(&self) -> Result<String> {
        let url = &self.config.primary_page_url;
        match self.fetcher.fetch(url).await {
            Ok(page) => Ok(page.body),
            Err(e) => {
                error!(url = %url, error = %e, "Primary listing page unavailable");
                Err(PipelineError::PrimarySourceUnavailable(e))
            }
        }
    }

    /// Page two is optional; any failure degrades to empty markup.
    async fn fetch_secondary(&self) -> String {
        let url = &self.config.secondary_page_url;
        match self.fetcher.fetch(url).await {
            Ok(page) => page.body,
            Err(e) if e.is_not_found() => {
                info!(url = %url, "Second listing page not found, using first page only");
                String::new()
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Second listing page failed, using first page only");
                String::new()
            }
        }
    }
}

impl<F: PageFetcher> Pipeline<F, Box<dyn ClassificationBackend>> {
    /// Create a pipeline whose backend is throttled when the config sets
    /// `requests_per_second`.
    pub fn throttled<B: ClassificationBackend + 'static>(
        fetcher: F,
        backend: B,
        config: PipelineConfig,
    ) -> Self {
        let backend: Box<dyn ClassificationBackend> = match config.requests_per_second {
            Some(rps) => {
                info!(requests_per_second = rps.get(), "Throttling classification backend");
                Box::new(RateLimitedBackend::new(backend, rps))
            }
            None => Box::new(backend),
        };
        Self::new(fetcher, backend, config)
    }
}

/// Drop duplicate ids.
///
/// Each id keeps the position of its first occurrence and the record of its
/// last occurrence.
pub fn dedupe_by_id(proposals: Vec<RawProposal>) -> Vec<RawProposal> {
    let mut unique: IndexMap<String, RawProposal> = IndexMap::with_capacity(proposals.len());
    for proposal in proposals {
        unique.insert(proposal.id.clone(), proposal);
    }
    unique.into_values().collect()
}
