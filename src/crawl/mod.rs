// src/crawl/mod.rs
// =============================================================================
// Turns a remote repository into a filtered file tree.
//
// - filter: which names are never visited (build output, lockfiles, ...)
// - tree:   the FileTreeNode the walk produces
// - walker: the depth-bounded, cancellable recursive walk
// =============================================================================

mod filter;
mod tree;
mod walker;

pub use filter::{SkipFilter, DEFAULT_SKIP_PATTERNS};
pub use tree::{FileTreeNode, TreeStats, MAX_FILE_SIZE};
pub use walker::TreeCrawler;
