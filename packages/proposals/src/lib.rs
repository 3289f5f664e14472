//! Legislative Proposals Pipeline
//!
//! Scrapes the IND (indicação) listing of a SAPL municipal council portal,
//! classifies each ementa into a fixed urban-services taxonomy through a
//! structured-output language model, and aggregates the result per category.
//!
//! # Usage
//!
//! ```rust,ignore
//! use proposals::{Pipeline, PipelineConfig, summarize};
//! use proposals::testing::{MockBackend, MockFetcher};
//!
//! let pipeline = Pipeline::new(MockFetcher::new(), MockBackend::new(), PipelineConfig::default());
//! let proposals = pipeline.run().await?;
//! let summary = summarize(&proposals);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Fetch and classification seams
//! - [`types`] - Taxonomy, proposal records and configuration
//! - [`extractor`] - Listing markup to raw proposals
//! - [`classifier`] - Cached, bounded classification with fallback
//! - [`pipeline`] - End-to-end orchestration
//! - [`summary`] - Per-category aggregation for charts
//! - [`fetchers`] - HTTP and relay fetchers
//! - [`backends`] - OpenAI and rate-limited backends
//! - [`testing`] - Mock implementations and markup fixtures

pub mod backends;
pub mod cache;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod fetchers;
pub mod pipeline;
pub mod security;
pub mod summary;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use cache::ClassificationCache;
pub use classifier::Classifier;
pub use error::{ClassifierError, FetchError, PipelineError, Result};
pub use extractor::{parse_proposals, RowRejection};
pub use pipeline::{dedupe_by_id, Pipeline};
pub use summary::{filter_by_category, summarize, CategorySummary};
pub use traits::{
    backend::{ClassificationBackend, ClassificationRequest},
    fetcher::{FetchedPage, PageFetcher},
};
pub use types::{
    category::Category,
    config::PipelineConfig,
    proposal::{
        sort_by_protocol_date, ClassificationResult, ClassifiedProposal, ProposalStatus,
        RawProposal,
    },
};
