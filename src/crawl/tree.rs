// src/crawl/tree.rs
// =============================================================================
// The file tree produced by a crawl.
//
// A node is either a File (size + download reference, no children) or a
// Directory (children, no size). The constructors below are the only way to
// build one, so the two shapes never mix. Serialized with camelCase keys and
// absent fields omitted:
//
//   { "name": "src", "kind": "directory", "path": "src", "depth": 1,
//     "children": [], "truncated": true, "message": "..." }
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::github::EntryKind;

/// Files at or above this size are dropped from the tree.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeNode {
    pub name: String,
    pub kind: EntryKind,
    pub path: String,
    pub depth: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileTreeNode {
    pub fn file(
        name: impl Into<String>,
        path: impl Into<String>,
        depth: usize,
        size: u64,
        download_ref: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            path: path.into(),
            depth,
            size: Some(size),
            download_ref,
            children: None,
            truncated: false,
            message: None,
        }
    }

    pub fn directory(
        name: impl Into<String>,
        path: impl Into<String>,
        depth: usize,
        children: Vec<FileTreeNode>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            path: path.into(),
            depth,
            size: None,
            download_ref: None,
            children: Some(children),
            truncated: false,
            message: None,
        }
    }

    /// A directory the walk stopped at because of the depth ceiling.
    pub fn truncated(
        name: impl Into<String>,
        path: impl Into<String>,
        depth: usize,
        max_depth: usize,
    ) -> Self {
        let mut node = Self::directory(name, path, depth, Vec::new());
        node.truncated = true;
        node.message = Some(format!(
            "Maximum depth of {} reached; contents not listed",
            max_depth
        ));
        node
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn children(&self) -> &[FileTreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Visits this node and every descendant, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a FileTreeNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Counts files, directories and bytes below (and including) this node.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.walk(&mut |node| {
            if node.is_dir() {
                stats.directories += 1;
                if node.truncated {
                    stats.truncated_directories += 1;
                }
            } else {
                stats.files += 1;
                stats.total_bytes += node.size.unwrap_or(0);
            }
            stats.max_depth = stats.max_depth.max(node.depth);
        });
        stats
    }
}

/// Summary numbers for a finished tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub files: usize,
    pub directories: usize,
    pub truncated_directories: usize,
    pub total_bytes: u64,
    pub max_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileTreeNode {
        FileTreeNode::directory(
            "widgets",
            "",
            0,
            vec![
                FileTreeNode::file("readme.txt", "readme.txt", 1, 10, Some("ref".into())),
                FileTreeNode::directory(
                    "src",
                    "src",
                    1,
                    vec![
                        FileTreeNode::file("lib.rs", "src/lib.rs", 2, 300, None),
                        FileTreeNode::truncated("deep", "src/deep", 2, 2),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.directories, 3);
        assert_eq!(stats.truncated_directories, 1);
        assert_eq!(stats.total_bytes, 310);
        assert_eq!(stats.max_depth, 2);
    }

    #[test]
    fn test_walk_visits_parents_before_children_in_order() {
        let tree = sample();
        let mut paths = Vec::new();
        tree.walk(&mut |node| paths.push(node.path.as_str()));
        assert_eq!(paths, vec!["", "readme.txt", "src", "src/lib.rs", "src/deep"]);
    }

    #[test]
    fn test_file_and_directory_shapes_do_not_mix() {
        let file = FileTreeNode::file("a", "a", 1, 5, None);
        assert!(file.children.is_none());
        assert_eq!(file.size, Some(5));

        let dir = FileTreeNode::truncated("d", "d", 3, 3);
        assert!(dir.size.is_none() && dir.download_ref.is_none());
        assert_eq!(dir.children(), &[] as &[FileTreeNode]);
        assert!(dir.truncated);
        assert!(dir.message.unwrap().contains('3'));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        let readme = &json["children"][0];
        assert_eq!(readme["kind"], "file");
        assert_eq!(readme["downloadRef"], "ref");
        assert!(readme.get("children").is_none());
        assert!(readme.get("truncated").is_none());

        let deep = &json["children"][1]["children"][1];
        assert_eq!(deep["kind"], "directory");
        assert_eq!(deep["truncated"], true);
        assert_eq!(deep["children"], serde_json::json!([]));
        assert!(deep.get("size").is_none());
    }
}
