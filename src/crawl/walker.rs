// src/crawl/walker.rs
// =============================================================================
// Walks a remote repository into a FileTreeNode.
//
// How it works:
// 1. Start at the repository root (depth 0)
// 2. List the directory through the SourceClient
// 3. For each entry, in listing order:
//    - skip it if its name matches a skip pattern
//    - recurse into directories at depth + 1
//    - keep files smaller than MAX_FILE_SIZE
// 4. Directories at depth >= max_depth are not listed; they come back as
//    truncated leaves instead
//
// The walk is depth-first and strictly sequential: one listing request is in
// flight at a time, which keeps us clear of upstream secondary rate limits.
//
// Cancellation is cooperative. The session's flag is checked before each
// listing, right after it returns, and before each entry; once it is set the
// whole walk unwinds with CrawlError::Cancelled and no partial tree.
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info, trace, warn};

use super::filter::SkipFilter;
use super::tree::{FileTreeNode, MAX_FILE_SIZE};
use crate::error::CrawlError;
use crate::github::{EntryKind, RepoAddress, SourceClient};
use crate::session::Session;

/// Walks one repository. Borrowed pieces only; build one per crawl.
pub struct TreeCrawler<'a> {
    client: &'a dyn SourceClient,
    filter: &'a SkipFilter,
    session: &'a Session,
    address: &'a RepoAddress,
    max_depth: usize,
}

impl<'a> TreeCrawler<'a> {
    pub fn new(
        client: &'a dyn SourceClient,
        filter: &'a SkipFilter,
        session: &'a Session,
        address: &'a RepoAddress,
        max_depth: usize,
    ) -> Self {
        Self {
            client,
            filter,
            session,
            address,
            max_depth,
        }
    }

    /// Crawls the whole repository starting at its root.
    pub async fn crawl(&self) -> Result<FileTreeNode, CrawlError> {
        info!(
            repo = %self.address,
            max_depth = self.max_depth,
            session = %self.session.id(),
            "crawl started"
        );

        let result = self.walk(self.address.repo.clone(), String::new(), 0).await;

        match &result {
            Ok(tree) => {
                let stats = tree.stats();
                info!(
                    repo = %self.address,
                    files = stats.files,
                    directories = stats.directories,
                    truncated = stats.truncated_directories,
                    "crawl finished"
                );
            }
            Err(CrawlError::Cancelled) => warn!(repo = %self.address, "crawl cancelled"),
            Err(CrawlError::Fetch(e)) => warn!(repo = %self.address, error = %e, "crawl failed"),
        }
        result
    }

    fn check_cancelled(&self) -> Result<(), CrawlError> {
        if self.session.is_cancelled() {
            Err(CrawlError::Cancelled)
        } else {
            Ok(())
        }
    }

    // Async recursion needs a boxed future: the future for one directory
    // contains the futures of its subdirectories.
    fn walk(&self, name: String, path: String, depth: usize) -> BoxFuture<'_, Result<FileTreeNode, CrawlError>> {
        async move {
            self.check_cancelled()?;

            if depth >= self.max_depth {
                trace!(%path, depth, "depth ceiling reached");
                self.session.record_progress(depth, self.max_depth, &path);
                return Ok(FileTreeNode::truncated(name, path, depth, self.max_depth));
            }

            debug!(%path, depth, "listing directory");
            let entries = self
                .client
                .list_directory(&self.address.owner, &self.address.repo, &path)
                .await?;

            // The listing may have taken a while; drop its result if we were
            // cancelled in the meantime.
            self.check_cancelled()?;

            let mut children = Vec::with_capacity(entries.len());
            for entry in entries {
                self.check_cancelled()?;

                if self.filter.should_skip(&entry.name) {
                    trace!(path = %entry.path, "skipped by pattern");
                    continue;
                }

                match entry.kind {
                    EntryKind::Directory => {
                        let child = self.walk(entry.name, entry.path, depth + 1).await?;
                        children.push(child);
                    }
                    EntryKind::File if entry.size < MAX_FILE_SIZE => {
                        children.push(FileTreeNode::file(
                            entry.name,
                            entry.path,
                            depth + 1,
                            entry.size,
                            entry.download_ref,
                        ));
                    }
                    EntryKind::File => {
                        trace!(path = %entry.path, size = entry.size, "file over size ceiling");
                    }
                }
            }

            self.session.record_progress(depth, self.max_depth, &path);
            Ok(FileTreeNode::directory(name, path, depth, children))
        }
        .boxed()
    }
}
