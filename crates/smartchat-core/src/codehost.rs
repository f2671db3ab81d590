//! CodeHost trait definition.
//!
//! The code-hosting service is consumed as a black box: repository lookup,
//! top-level listing and single-file fetch. Implementations live in
//! smartchat-infra (e.g., `GitHubClient`).

use std::future::Future;

use smartchat_types::error::RelayError;
use smartchat_types::repository::{RepoEntry, RepoFile, RepositoryHandle};

pub trait CodeHost: Send + Sync {
    /// Whether a credential is configured. Without one every repository
    /// feature is disabled and calls fail with `RepositoryNotConfigured`.
    fn is_configured(&self) -> bool;

    /// Look up `owner/name`.
    fn repository(
        &self,
        owner: &str,
        name: &str,
    ) -> impl Future<Output = Result<RepositoryHandle, RelayError>> + Send;

    /// First repository owned by the configured account.
    fn first_owned_repository(
        &self,
    ) -> impl Future<Output = Result<RepositoryHandle, RelayError>> + Send;

    /// Top-level entries of the repository's default branch.
    fn list_root(
        &self,
        repo: &RepositoryHandle,
    ) -> impl Future<Output = Result<Vec<RepoEntry>, RelayError>> + Send;

    /// Fetch one file at `path` on the default branch.
    fn file(
        &self,
        repo: &RepositoryHandle,
        path: &str,
    ) -> impl Future<Output = Result<RepoFile, RelayError>> + Send;
}
