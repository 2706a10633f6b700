// src/store.rs
// =============================================================================
// Where finished trees go.
//
// The orchestrator only sees the `TreeStore` trait and calls it once, after a
// crawl completed. `JsonFileStore` writes one pretty-printed JSON document per
// analysis:
//
//   <dir>/<owner>-<repo>-<YYYYmmddTHHMMSSmmm>.json
// =============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::crawl::{FileTreeNode, TreeStats};
use crate::github::RepoAddress;
use crate::session::CallerId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What the store hands back after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: String,
    pub caller: CallerId,
    pub source_address: String,
    pub saved_at: DateTime<Utc>,
    pub location: String,
    pub stats: TreeStats,
}

#[async_trait]
pub trait TreeStore: Send + Sync {
    async fn save(
        &self,
        caller: &CallerId,
        source_address: &str,
        repo: &RepoAddress,
        tree: &FileTreeNode,
    ) -> Result<StoredRecord, StoreError>;
}

// On-disk document layout
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredTree<'a> {
    id: &'a str,
    caller: &'a CallerId,
    source_address: &'a str,
    repository: &'a RepoAddress,
    saved_at: DateTime<Utc>,
    stats: TreeStats,
    tree: &'a FileTreeNode,
}

/// Saves each tree as a JSON file under one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TreeStore for JsonFileStore {
    async fn save(
        &self,
        caller: &CallerId,
        source_address: &str,
        repo: &RepoAddress,
        tree: &FileTreeNode,
    ) -> Result<StoredRecord, StoreError> {
        let saved_at = Utc::now();
        let id = format!(
            "{}-{}-{}",
            sanitize(&repo.owner),
            sanitize(&repo.repo),
            saved_at.format("%Y%m%dT%H%M%S%3f")
        );
        let stats = tree.stats();

        let document = StoredTree {
            id: &id,
            caller,
            source_address,
            repository: repo,
            saved_at,
            stats,
            tree,
        };
        let bytes = serde_json::to_vec_pretty(&document)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
        let path = self.dir.join(format!("{}.json", id));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), files = stats.files, "tree saved");

        Ok(StoredRecord {
            id,
            caller: caller.clone(),
            source_address: source_address.to_string(),
            saved_at,
            location: path.display().to_string(),
            stats,
        })
    }
}

// Keep owner/repo names safe to use as a file name
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoAddress {
        RepoAddress {
            owner: "acme".into(),
            repo: "widgets".into(),
        }
    }

    fn tree() -> FileTreeNode {
        FileTreeNode::directory(
            "widgets",
            "",
            0,
            vec![FileTreeNode::file("readme.txt", "readme.txt", 1, 10, None)],
        )
    }

    #[tokio::test]
    async fn test_save_writes_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("trees"));
        let caller = CallerId::new("alice");

        let record = store
            .save(&caller, "https://github.com/acme/widgets", &repo(), &tree())
            .await
            .unwrap();

        assert!(record.id.starts_with("acme-widgets-"));
        assert_eq!(record.caller, caller);
        assert_eq!(record.stats.files, 1);

        let written = std::fs::read_to_string(&record.location).unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["caller"], "alice");
        assert_eq!(json["sourceAddress"], "https://github.com/acme/widgets");
        assert_eq!(json["repository"]["owner"], "acme");
        assert_eq!(json["tree"]["children"][0]["name"], "readme.txt");
        assert_eq!(json["stats"]["totalBytes"], 10);
    }

    #[tokio::test]
    async fn test_save_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let store = JsonFileStore::new(&blocker);
        let result = store
            .save(&CallerId::new("alice"), "acme/widgets", &repo(), &tree())
            .await;
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("my.repo-name_1"), "my.repo-name_1");
        assert_eq!(sanitize("we/ird name"), "we_ird_name");
    }
}
