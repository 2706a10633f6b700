// src/github/mod.rs
// =============================================================================
// Everything that knows about the upstream source host.
//
// - address: parse "https://github.com/owner/repo" into an identity
// - client:  list one directory through the contents API
// =============================================================================

mod address;
mod client;

pub use address::{parse_repo_address, RepoAddress};
pub use client::{
    ClientConfig, EntryKind, FetchError, GithubClient, RepoEntry, SourceClient, DEFAULT_API_URL,
};
