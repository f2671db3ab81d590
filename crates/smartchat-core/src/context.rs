//! Repository context fetching.
//!
//! [`ContextFetcher`] turns a chat message into an optional
//! [`PromptContextBlock`] of source files pulled from the active repository.
//! Enrichment is best-effort: every failure downgrades to "no context" or,
//! for a single file, to a placeholder noting the failure. Nothing here ever
//! fails a chat turn.

use std::fmt;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::join_all;
use tracing::{debug, warn};

use smartchat_types::error::RelayError;
use smartchat_types::repository::{EntryKind, RepoFile, RepositoryHandle};

use crate::codehost::CodeHost;
use crate::keywords::{target_paths, wants_repository_context};
use crate::registry::ActiveRepository;

/// Content of one file in a context block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    Content(String),
    /// The file could not be fetched or decoded; holds the reason.
    Unavailable(String),
}

/// Source files assembled for a single chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContextBlock {
    repository: String,
    files: Vec<(String, FileBody)>,
}

impl PromptContextBlock {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            files: Vec::new(),
        }
    }

    pub fn push(&mut self, path: impl Into<String>, body: FileBody) {
        self.files.push((path.into(), body));
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn files(&self) -> &[(String, FileBody)] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl fmt::Display for PromptContextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Repositorio: {}", self.repository)?;
        for (path, body) in &self.files {
            write!(f, "\n\n--- {path} ---\n")?;
            match body {
                FileBody::Content(content) => write!(f, "{}", content.trim_end())?,
                FileBody::Unavailable(reason) => {
                    write!(f, "[No se pudo obtener el archivo: {reason}]")?
                }
            }
        }
        Ok(())
    }
}

/// Decode a fetched file from its transport encoding into text.
pub fn decode_file(file: &RepoFile) -> Result<String, RelayError> {
    if file.kind != EntryKind::File {
        return Err(RelayError::Decode(format!("'{}' is not a file", file.path)));
    }

    match file.encoding.as_deref() {
        Some("base64") => {
            // The contents API wraps base64 payloads at 60 columns.
            let compact: String = file
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| RelayError::Decode(format!("invalid base64 in '{}': {e}", file.path)))?;
            String::from_utf8(bytes)
                .map_err(|e| RelayError::Decode(format!("'{}' is not UTF-8: {e}", file.path)))
        }
        None | Some("") | Some("utf-8") => Ok(file.content.clone()),
        Some(other) => Err(RelayError::Decode(format!(
            "unsupported encoding '{other}' for '{}'",
            file.path
        ))),
    }
}

/// Builds context blocks from the active repository.
pub struct ContextFetcher<H: CodeHost> {
    host: Arc<H>,
    registry: Arc<ActiveRepository>,
}

impl<H: CodeHost> ContextFetcher<H> {
    pub fn new(host: Arc<H>, registry: Arc<ActiveRepository>) -> Self {
        Self { host, registry }
    }

    /// Context for `message`, or `None` when the message does not ask for
    /// it or no repository can be resolved.
    ///
    /// Messages without a trigger keyword return immediately without any
    /// network call.
    pub async fn fetch_context(&self, message: &str) -> Option<PromptContextBlock> {
        if !wants_repository_context(message) {
            return None;
        }
        if !self.host.is_configured() {
            debug!("Repository context requested but no credential is configured");
            return None;
        }

        let repo = self.resolve_repository().await?;
        let paths = target_paths(message);
        let fetches = paths.iter().map(|path| self.fetch_body(&repo, path));
        let bodies = join_all(fetches).await;

        let mut block = PromptContextBlock::new(repo.full_name());
        for (path, body) in paths.into_iter().zip(bodies) {
            block.push(path, body);
        }

        debug!(
            repository = %repo,
            files = block.files().len(),
            "Assembled repository context"
        );
        Some(block)
    }

    /// Active repository, auto-resolving the account's first repository
    /// when none is connected.
    async fn resolve_repository(&self) -> Option<Arc<RepositoryHandle>> {
        if let Some(repo) = self.registry.get() {
            return Some(repo);
        }

        match self.host.first_owned_repository().await {
            // A connect may have landed while the lookup was in flight; it wins.
            Ok(repo) => {
                debug!(repository = %repo, "Auto-resolved first owned repository");
                self.registry.set_if_empty(repo)
            }
            Err(err) => {
                warn!(error = %err, "Could not auto-resolve a repository for context");
                None
            }
        }
    }

    async fn fetch_body(&self, repo: &RepositoryHandle, path: &str) -> FileBody {
        let decoded = match self.host.file(repo, path).await {
            Ok(file) => decode_file(&file),
            Err(err) => Err(err),
        };

        match decoded {
            Ok(content) => FileBody::Content(content),
            Err(err) => {
                warn!(repository = %repo, path, error = %err, "Context file unavailable");
                FileBody::Unavailable(err.to_string())
            }
        }
    }
}
