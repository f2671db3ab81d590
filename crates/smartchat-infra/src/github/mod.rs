//! GitHubClient -- concrete [`CodeHost`] over the GitHub REST API.
//!
//! The token is wrapped in [`SecretString`] and only exposed when building
//! the `Authorization` header. Without a token the client reports itself
//! unconfigured and every call fails with `RepositoryNotConfigured` before
//! touching the network.

pub mod types;

use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use smartchat_core::codehost::CodeHost;
use smartchat_types::config::RelayConfig;
use smartchat_types::error::RelayError;
use smartchat_types::repository::{EntryKind, RepoEntry, RepoFile, RepositoryHandle};

use crate::http::{build_client, map_transport_error, status_error};
use types::{GhContents, GhRepository};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GitHubClient {
    http: reqwest::Client,
    token: Option<SecretString>,
    account: Option<String>,
    api_base: String,
    timeout: Duration,
}

impl GitHubClient {
    pub fn new(
        api_base: impl Into<String>,
        token: Option<SecretString>,
        account: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RelayError> {
        let token = token.filter(|t| !t.expose_secret().trim().is_empty());
        Ok(Self {
            http: build_client(concat!("smartchat/", env!("CARGO_PKG_VERSION")))?,
            token,
            account: account.filter(|a| !a.trim().is_empty()),
            api_base: api_base.into(),
            timeout,
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        Self::new(
            config.github_api_base.clone(),
            config.github_token.clone().map(SecretString::from),
            config.github_account.clone(),
            Duration::from_secs(config.github_timeout_secs),
        )
    }

    fn token(&self) -> Result<&SecretString, RelayError> {
        self.token.as_ref().ok_or(RelayError::RepositoryNotConfigured)
    }

    /// Builds `{api_base}/{segments..}?{query}` with every segment and
    /// query value percent-encoded on its own.
    fn api_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
        query: &[(&str, &str)],
    ) -> Result<Url, RelayError> {
        let invalid = || {
            RelayError::UpstreamUnavailable(format!("invalid GitHub API base '{}'", self.api_base))
        };
        let mut url = Url::parse(&self.api_base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|segment| !segment.is_empty()));
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RelayError> {
        let token = self.token()?;
        debug!(url = %url, "GitHub API request");

        let response = self
            .http
            .get(url.clone())
            .timeout(self.timeout)
            .bearer_auth(token.expose_secret())
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(API_VERSION_HEADER, API_VERSION)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| RelayError::Decode(format!("GitHub response for {}: {e}", url.path())))
    }

    fn contents_url(&self, repo: &RepositoryHandle, path: &str) -> Result<Url, RelayError> {
        let segments = ["repos", repo.owner.as_str(), repo.name.as_str(), "contents"];
        self.api_url(
            segments.into_iter().chain(path.split('/')),
            &[("ref", repo.default_branch.as_str())],
        )
    }
}

impl CodeHost for GitHubClient {
    fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    async fn repository(&self, owner: &str, name: &str) -> Result<RepositoryHandle, RelayError> {
        let repo: GhRepository = self.get_json(self.api_url(["repos", owner, name], &[])?).await?;
        Ok(repo.into())
    }

    async fn first_owned_repository(&self) -> Result<RepositoryHandle, RelayError> {
        let url = match &self.account {
            Some(account) => self.api_url(
                ["users", account.as_str(), "repos"],
                &[("type", "owner"), ("per_page", "1")],
            )?,
            None => self.api_url(
                ["user", "repos"],
                &[("affiliation", "owner"), ("per_page", "1")],
            )?,
        };
        let repos: Vec<GhRepository> = self.get_json(url).await?;
        repos
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| RelayError::UpstreamError {
                status: 404,
                message: "account has no repositories".to_string(),
            })
    }

    async fn list_root(&self, repo: &RepositoryHandle) -> Result<Vec<RepoEntry>, RelayError> {
        match self.get_json(self.contents_url(repo, "")?).await? {
            GhContents::Listing(entries) => Ok(entries.into_iter().map(Into::into).collect()),
            GhContents::Single(entry) => Ok(vec![(*entry).into()]),
        }
    }

    async fn file(&self, repo: &RepositoryHandle, path: &str) -> Result<RepoFile, RelayError> {
        match self.get_json(self.contents_url(repo, path)?).await? {
            GhContents::Single(content) => Ok((*content).into()),
            GhContents::Listing(_) => Ok(RepoFile {
                path: path.to_string(),
                kind: EntryKind::Dir,
                encoding: None,
                content: String::new(),
            }),
        }
    }
}
