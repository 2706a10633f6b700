// src/analysis.rs
// =============================================================================
// The three operations callers use:
//
// - start_analysis: resolve the address, register a session, crawl,
//                   release the session, save the tree
// - request_cancel: flag the caller's live session(s) as cancelled
// - query_progress: report the caller's live session, if any
//
// start_analysis always ends in exactly one of three outcomes: Completed
// (tree saved), Cancelled (nothing saved), or Failed (with the reason).
// =============================================================================

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::crawl::{FileTreeNode, SkipFilter, TreeCrawler};
use crate::error::AnalysisError;
use crate::github::{parse_repo_address, SourceClient};
use crate::session::{CallerId, SessionId, SessionRegistry, SessionSnapshot};
use crate::store::{StoredRecord, TreeStore};

/// Accepted range for the depth ceiling; requests outside it are clamped.
pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 20;
pub const DEFAULT_DEPTH: usize = 5;

/// How an analysis ended.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Completed {
        record: StoredRecord,
        tree: FileTreeNode,
    },
    Cancelled,
    Failed {
        reason: String,
    },
}

/// Reply to a cancel request. Always acknowledged, even with nothing to cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelAck {
    pub acknowledged: bool,
    pub cancelled: usize,
}

/// Reply to a progress request: `{ "active": false }` or the live snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub active: bool,
    #[serde(flatten)]
    pub session: Option<SessionSnapshot>,
}

pub fn clamp_depth(requested: i64) -> usize {
    requested.clamp(MIN_DEPTH as i64, MAX_DEPTH as i64) as usize
}

/// Runs analyses and answers cancel / progress requests about them.
///
/// Share one `Analyzer` (behind an `Arc`) between everything that needs to
/// see the same sessions.
pub struct Analyzer {
    client: Arc<dyn SourceClient>,
    store: Arc<dyn TreeStore>,
    filter: SkipFilter,
    registry: Arc<SessionRegistry>,
}

impl Analyzer {
    pub fn new(client: Arc<dyn SourceClient>, store: Arc<dyn TreeStore>, filter: SkipFilter) -> Self {
        Self {
            client,
            store,
            filter,
            registry: SessionRegistry::new(),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub async fn start_analysis(
        &self,
        caller: &CallerId,
        source_address: &str,
        max_depth: i64,
    ) -> AnalysisOutcome {
        match self.run(caller, source_address, clamp_depth(max_depth)).await {
            Ok((tree, record)) => AnalysisOutcome::Completed { record, tree },
            Err(AnalysisError::Cancelled) => {
                info!(%caller, source_address, "analysis cancelled");
                AnalysisOutcome::Cancelled
            }
            Err(e) => {
                warn!(%caller, source_address, error = %e, "analysis failed");
                AnalysisOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn run(
        &self,
        caller: &CallerId,
        source_address: &str,
        max_depth: usize,
    ) -> Result<(FileTreeNode, StoredRecord), AnalysisError> {
        let address = parse_repo_address(source_address)?;
        info!(%caller, repo = %address, max_depth, "analysis started");

        // The guard also releases the session if this future is dropped
        // mid-crawl or the crawl panics.
        let guard = self
            .registry
            .register_guarded(SessionId::start(caller.clone()));
        let crawled = TreeCrawler::new(
            self.client.as_ref(),
            &self.filter,
            guard.session(),
            &address,
            max_depth,
        )
        .crawl()
        .await;
        drop(guard);
        let tree = crawled?;

        let record = self.store.save(caller, source_address, &address, &tree).await?;
        Ok((tree, record))
    }

    pub fn request_cancel(&self, caller: &CallerId) -> CancelAck {
        CancelAck {
            acknowledged: true,
            cancelled: self.registry.mark_cancelled(caller),
        }
    }

    pub fn query_progress(&self, caller: &CallerId) -> ProgressReport {
        let session = self.registry.progress(caller);
        ProgressReport {
            active: session.is_some(),
            session,
        }
    }
}
