// src/github/client.rs
// =============================================================================
// Lists the entries of one directory of a GitHub repository.
//
// The crawler only knows the `SourceClient` trait, so tests can swap in an
// in-memory listing and other hosts could be added later. `GithubClient`
// is the real implementation, backed by the REST contents API:
//
//   GET {api}/repos/{owner}/{repo}/contents/{path}
//
// Every request carries a timeout; a slow upstream surfaces as
// `FetchError::Timeout` instead of hanging the crawl.
// =============================================================================

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Whether a listed entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a directory listing, in the order upstream returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub name: String,
    pub kind: EntryKind,
    pub path: String,
    pub size: u64,
    pub download_ref: Option<String>,
}

/// Ways a directory listing can fail.
///
/// The crawl treats every variant as fatal; they stay distinct so callers
/// can word their messages.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by upstream while listing {0}")]
    RateLimited(String),

    #[error("request timed out while listing {0}")]
    Timeout(String),

    #[error("upstream returned HTTP {status} for {path}")]
    Status { status: u16, path: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected listing format for {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("cannot build request URL: {0}")]
    BadUrl(String),
}

/// The "list entries under a repository path" capability the crawler needs.
#[async_trait]
pub trait SourceClient: Send + Sync {
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<RepoEntry>, FetchError>;
}

/// Settings for the GitHub client, filled in from the CLI.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

// Shape of one item in the contents API response.
// `type` is "file", "dir", "symlink" or "submodule"; only "dir" is walked.
#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    size: u64,
    download_url: Option<String>,
}

impl From<ContentItem> for RepoEntry {
    fn from(item: ContentItem) -> Self {
        let kind = if item.item_type == "dir" {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        RepoEntry {
            name: item.name,
            kind,
            path: item.path,
            size: item.size,
            download_ref: item.download_url,
        }
    }
}

/// `SourceClient` backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    api_url: Url,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| FetchError::BadUrl(format!("{}: {}", config.api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(FetchError::BadUrl(config.api_url));
        }

        // One client for the whole process so connections are pooled
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("repo-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_url,
            token: config.token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Result<Url, FetchError> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::BadUrl(self.api_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(["repos", owner, repo, "contents"]);
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }
}

#[async_trait]
impl SourceClient for GithubClient {
    async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Vec<RepoEntry>, FetchError> {
        let url = self.contents_url(owner, repo, path)?;
        let display_path = format!("{}/{}/{}", owner, repo, path);
        debug!(%url, "listing directory");

        let mut request = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| categorize_error(&display_path, e))?;

        let status = response.status();
        if !status.is_success() {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(classify_status(status, remaining.as_deref(), &display_path));
        }

        // A path that names a file returns an object instead of an array
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| categorize_error(&display_path, e))?;
        parse_listing(body, &display_path)
    }
}

fn parse_listing(body: serde_json::Value, path: &str) -> Result<Vec<RepoEntry>, FetchError> {
    if !body.is_array() {
        return Err(FetchError::Decode {
            path: path.to_string(),
            reason: "expected a directory listing, got a single entry".to_string(),
        });
    }
    let items: Vec<ContentItem> = serde_json::from_value(body).map_err(|e| FetchError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(items.into_iter().map(RepoEntry::from).collect())
}

// Maps a non-success status to a FetchError.
//
// GitHub answers an exhausted quota with 403 and x-ratelimit-remaining: 0,
// secondary limits with 429.
fn classify_status(status: StatusCode, rate_remaining: Option<&str>, path: &str) -> FetchError {
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound(path.to_string()),
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited(path.to_string()),
        StatusCode::FORBIDDEN if rate_remaining == Some("0") => {
            FetchError::RateLimited(path.to_string())
        }
        other => FetchError::Status {
            status: other.as_u16(),
            path: path.to_string(),
        },
    }
}

fn categorize_error(path: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(path.to_string())
    } else if error.is_decode() {
        FetchError::Decode {
            path: path.to_string(),
            reason: error.to_string(),
        }
    } else {
        FetchError::Network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(api_url: &str) -> GithubClient {
        GithubClient::new(ClientConfig {
            api_url: api_url.to_string(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_contents_url_for_root_and_nested_paths() {
        let client = client("https://api.github.com");
        assert_eq!(
            client.contents_url("acme", "widgets", "").unwrap().as_str(),
            "https://api.github.com/repos/acme/widgets/contents"
        );
        assert_eq!(
            client.contents_url("acme", "widgets", "src/lib").unwrap().as_str(),
            "https://api.github.com/repos/acme/widgets/contents/src/lib"
        );
    }

    #[test]
    fn test_contents_url_keeps_enterprise_prefix_and_escapes() {
        let client = client("https://git.example.com/api/v3/");
        assert_eq!(
            client.contents_url("acme", "widgets", "docs/my notes").unwrap().as_str(),
            "https://git.example.com/api/v3/repos/acme/widgets/contents/docs/my%20notes"
        );
    }

    #[test]
    fn test_rejects_bad_api_url() {
        let result = GithubClient::new(ClientConfig {
            api_url: "not a url".to_string(),
            ..ClientConfig::default()
        });
        assert!(matches!(result, Err(FetchError::BadUrl(_))));
    }

    #[test]
    fn test_parse_listing_preserves_order_and_kinds() {
        let body = json!([
            {"name": "src", "path": "src", "type": "dir", "size": 0, "download_url": null},
            {"name": "README.md", "path": "README.md", "type": "file", "size": 120,
             "download_url": "https://raw.example/README.md"},
            {"name": "vendored", "path": "vendored", "type": "submodule", "download_url": null}
        ]);
        let entries = parse_listing(body, "acme/widgets/").unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[1].kind, EntryKind::File);
        assert_eq!(entries[1].size, 120);
        assert_eq!(entries[1].download_ref.as_deref(), Some("https://raw.example/README.md"));
        assert_eq!(entries[2].kind, EntryKind::File);
        assert_eq!(entries[2].size, 0);
    }

    #[test]
    fn test_parse_listing_rejects_single_file_object() {
        let body = json!({"name": "README.md", "path": "README.md", "type": "file", "size": 1});
        assert!(matches!(parse_listing(body, "p"), Err(FetchError::Decode { .. })));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(classify_status(StatusCode::NOT_FOUND, None, "p"), FetchError::NotFound(_)));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, None, "p"),
            FetchError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, Some("0"), "p"),
            FetchError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, Some("42"), "p"),
            FetchError::Status { status: 403, .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, None, "p"),
            FetchError::Status { status: 502, .. }
        ));
    }
}
