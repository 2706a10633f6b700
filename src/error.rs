// src/error.rs
// =============================================================================
// Error taxonomy for one analysis.
//
// Only `InvalidAddress`, `Fetch` and `Persist` are failures. `Cancelled` is a
// normal terminal state; callers turn it into its own outcome and never show
// it as an error. Oversized files and skip-pattern matches are not errors at
// all: they are simply absent from the tree.
// =============================================================================

use thiserror::Error;

use crate::github::FetchError;
use crate::store::StoreError;

/// Why a crawl stopped early.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("crawl cancelled")]
    Cancelled,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Everything that can end an analysis without a stored tree.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid repository address: {0:?}")]
    InvalidAddress(String),

    #[error("failed to list repository contents: {0}")]
    Fetch(#[source] FetchError),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("failed to save tree: {0}")]
    Persist(#[from] StoreError),
}

impl From<CrawlError> for AnalysisError {
    fn from(error: CrawlError) -> Self {
        match error {
            CrawlError::Cancelled => AnalysisError::Cancelled,
            CrawlError::Fetch(e) => AnalysisError::Fetch(e),
        }
    }
}
