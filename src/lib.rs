// src/lib.rs
// =============================================================================
// repo-scout: crawl a hosted repository into a filtered file tree.
//
// Modules, leaves first:
// - github:   address parsing and the directory-listing client
// - crawl:    skip patterns, the tree model and the recursive walk
// - session:  registry of in-flight crawls (progress + cancellation)
// - store:    where finished trees are saved
// - analysis: the orchestrator tying the above together
// - server:   HTTP endpoints over the orchestrator
// =============================================================================

pub mod analysis;
pub mod crawl;
pub mod error;
pub mod github;
pub mod server;
pub mod session;
pub mod store;

pub use analysis::{AnalysisOutcome, Analyzer, CancelAck, ProgressReport};
pub use error::{AnalysisError, CrawlError};
