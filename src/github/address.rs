// src/github/address.rs
// =============================================================================
// Turns a user-supplied repository address into an (owner, repo) pair.
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - https://github.com/owner/repo/tree/main/src   (extra segments ignored)
//   - github.com/owner/repo                          (no scheme)
//   - owner/repo                                     (no host)
//
// Any host is accepted; the first two path segments after it are the
// identity. Nothing here touches the network.
// =============================================================================

use serde::Serialize;
use std::fmt;
use url::Url;

use crate::error::AnalysisError;

/// The (owner, repository) identity of a remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoAddress {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parses a repository address.
///
/// Example:
///   "https://github.com/rust-lang/rust" -> rust-lang/rust
pub fn parse_repo_address(address: &str) -> Result<RepoAddress, AnalysisError> {
    let trimmed = address.trim();
    let invalid = || AnalysisError::InvalidAddress(address.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    // With a scheme we let the url crate find the host and path for us.
    // Without one, the first segment is a host only if it looks like one.
    let segments: Vec<String> = if trimmed.contains("://") {
        let url = Url::parse(trimmed).map_err(|_| invalid())?;
        if url.host_str().is_none() {
            return Err(invalid());
        }
        url.path_segments()
            .map(|parts| parts.map(str::to_string).collect())
            .unwrap_or_default()
    } else {
        let path = trimmed
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        let mut parts = path.split('/').filter(|s| !s.is_empty()).peekable();
        if parts.peek().map_or(false, |first| looks_like_host(first)) {
            parts.next();
        }
        parts.map(str::to_string).collect()
    };

    let mut parts = segments.into_iter().filter(|s| !s.is_empty());
    let owner = parts.next().ok_or_else(invalid)?;
    let repo = parts.next().ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(&repo).to_string();

    if repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoAddress { owner, repo })
}

fn looks_like_host(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(address: &str) -> (String, String) {
        let parsed = parse_repo_address(address).unwrap();
        (parsed.owner, parsed.repo)
    }

    #[test]
    fn test_parse_https_address() {
        assert_eq!(parse("https://github.com/rust-lang/rust"), ("rust-lang".into(), "rust".into()));
    }

    #[test]
    fn test_parse_any_host() {
        assert_eq!(parse("https://host.example/acme/widgets"), ("acme".into(), "widgets".into()));
    }

    #[test]
    fn test_parse_with_git_suffix() {
        assert_eq!(parse("https://github.com/user/repo.git"), ("user".into(), "repo".into()));
    }

    #[test]
    fn test_parse_without_scheme() {
        assert_eq!(parse("github.com/user/repo"), ("user".into(), "repo".into()));
        assert_eq!(parse("www.github.com/user/repo/"), ("user".into(), "repo".into()));
    }

    #[test]
    fn test_parse_bare_owner_repo() {
        assert_eq!(parse("user/repo"), ("user".into(), "repo".into()));
    }

    #[test]
    fn test_parse_ignores_extra_segments_and_query() {
        assert_eq!(
            parse("https://github.com/user/repo/tree/main/src?tab=readme#top"),
            ("user".into(), "repo".into())
        );
        assert_eq!(parse("github.com/user/repo?x=1"), ("user".into(), "repo".into()));
    }

    #[test]
    fn test_parse_invalid_addresses() {
        for address in ["", "   ", "https://github.com/", "https://github.com/only-owner", "github.com/user", "not a url at all"] {
            let result = parse_repo_address(address);
            assert!(
                matches!(result, Err(AnalysisError::InvalidAddress(_))),
                "expected InvalidAddress for {:?}",
                address
            );
        }
    }

    #[test]
    fn test_display() {
        let address = parse_repo_address("acme/widgets").unwrap();
        assert_eq!(address.to_string(), "acme/widgets");
    }
}
