//! Repository connect orchestrator.
//!
//! Parses a repository URL, opens it on the code host, makes it the active
//! repository and renders a summary. The caller always gets a displayable
//! string: failures are rendered, never returned.

use std::sync::Arc;

use tracing::{info, warn};

use smartchat_types::error::{FAILURE_MARKER, RelayError, SUCCESS_MARKER};
use smartchat_types::repository::{EntryKind, RepoEntry, RepositoryHandle};

use crate::codehost::CodeHost;
use crate::registry::ActiveRepository;

/// Literal host marker a repository URL must contain.
pub const HOST_MARKER: &str = "github.com/";

/// How many top-level entries are inspected for the summary.
pub const LISTING_LIMIT: usize = 10;

/// Split a repository URL into `(owner, name)`.
pub fn parse_repository_url(url: &str) -> Result<(String, String), RelayError> {
    let invalid = || RelayError::InvalidRepositoryUrl(url.to_string());

    let remainder = url.rsplit(HOST_MARKER).next().filter(|_| url.contains(HOST_MARKER));
    let remainder = remainder.ok_or_else(invalid)?;

    let mut segments = remainder.split('/').map(str::trim).filter(|s| !s.is_empty());
    let owner = segments.next().ok_or_else(invalid)?;
    let name = segments.next().ok_or_else(invalid)?;
    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() {
        return Err(invalid());
    }

    Ok((owner.to_string(), name.to_string()))
}

pub struct RepositoryConnector<H: CodeHost> {
    host: Arc<H>,
    registry: Arc<ActiveRepository>,
}

impl<H: CodeHost> RepositoryConnector<H> {
    pub fn new(host: Arc<H>, registry: Arc<ActiveRepository>) -> Self {
        Self { host, registry }
    }

    /// Connect `repo_url` and return the formatted outcome.
    ///
    /// On success the repository replaces the active one for every session.
    /// On failure the active repository is left untouched.
    pub async fn connect(&self, repo_url: &str) -> String {
        match self.try_connect(repo_url).await {
            Ok((repo, files)) => {
                info!(repository = %repo, files = files.len(), "Repository connected");
                let summary = format_summary(&repo, &files);
                self.registry.set(repo);
                summary
            }
            Err(err) => {
                warn!(url = %repo_url, error = %err, "Repository connect failed");
                format_failure(&err)
            }
        }
    }

    async fn try_connect(
        &self,
        repo_url: &str,
    ) -> Result<(RepositoryHandle, Vec<RepoEntry>), RelayError> {
        if !self.host.is_configured() {
            return Err(RelayError::RepositoryNotConfigured);
        }

        let (owner, name) = parse_repository_url(repo_url)?;
        let repo = self.host.repository(&owner, &name).await?;
        let files = self
            .host
            .list_root(&repo)
            .await?
            .into_iter()
            .take(LISTING_LIMIT)
            .filter(|entry| entry.kind == EntryKind::File)
            .collect();

        Ok((repo, files))
    }
}

pub fn format_summary(repo: &RepositoryHandle, files: &[RepoEntry]) -> String {
    let mut out = format!(
        "{SUCCESS_MARKER} Conectado exitosamente al repositorio: {name}\n\n\
         📊 Información del repositorio:\n\
         • Descripción: {description}\n\
         • Lenguaje principal: {language}\n\
         • Estrellas: {stars}\n\
         • Forks: {forks}\n\
         • Rama principal: {branch}\n\n\
         📁 Archivos principales:\n",
        name = repo.name,
        description = repo.description.as_deref().unwrap_or("Sin descripción"),
        language = repo.language.as_deref().unwrap_or("No especificado"),
        stars = repo.stars,
        forks = repo.forks,
        branch = repo.default_branch,
    );
    for file in files {
        out.push_str(&format!("• {} ({} bytes)\n", file.name, file.size));
    }
    out
}

fn format_failure(err: &RelayError) -> String {
    if err.is_local() {
        err.user_message()
    } else {
        format!("{FAILURE_MARKER} Error al conectar con GitHub: {err}")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::context::ContextFetcher;
    use crate::testing::{FakeHost, entry, repo};

    #[test]
    fn parse_plain_url() {
        assert_eq!(
            parse_repository_url("https://github.com/acme/widgets").unwrap(),
            ("acme".to_string(), "widgets".to_string())
        );
    }

    #[test]
    fn parse_strips_git_suffix_and_extra_segments() {
        assert_eq!(
            parse_repository_url("https://github.com/acme/widgets.git").unwrap(),
            ("acme".to_string(), "widgets".to_string())
        );
        assert_eq!(
            parse_repository_url("github.com/acme/widgets/tree/main/src").unwrap(),
            ("acme".to_string(), "widgets".to_string())
        );
    }

    #[test]
    fn parse_rejects_missing_marker_or_segments() {
        for url in [
            "https://gitlab.com/acme/widgets",
            "https://github.com/acme",
            "https://github.com/acme/",
            "https://github.com/",
            "https://github.com/acme/.git",
        ] {
            assert!(
                matches!(parse_repository_url(url), Err(RelayError::InvalidRepositoryUrl(_))),
                "{url}"
            );
        }
    }

    fn widgets() -> RepositoryHandle {
        RepositoryHandle {
            description: Some("Widget factory".to_string()),
            language: Some("Python".to_string()),
            stars: 42,
            forks: 7,
            ..repo("acme", "widgets")
        }
    }

    #[tokio::test]
    async fn connect_success_sets_registry_and_summarizes() {
        let mut entries = vec![
            entry("main.py", EntryKind::File, 1200),
            entry("src", EntryKind::Dir, 0),
        ];
        for i in 0..12 {
            entries.push(entry(&format!("extra{i}.txt"), EntryKind::File, 10));
        }
        let host = Arc::new(FakeHost::new().with_repository(widgets(), entries));
        let registry = Arc::new(ActiveRepository::new());
        let connector = RepositoryConnector::new(host, registry.clone());

        let summary = connector.connect("https://github.com/acme/widgets").await;

        assert!(summary.starts_with(SUCCESS_MARKER));
        assert!(summary.contains("• Descripción: Widget factory"));
        assert!(summary.contains("• Lenguaje principal: Python"));
        assert!(summary.contains("• Estrellas: 42"));
        assert!(summary.contains("• Forks: 7"));
        assert!(summary.contains("• Rama principal: main"));
        assert!(summary.contains("• main.py (1200 bytes)"));
        assert!(!summary.contains("• src"));
        // First ten entries, files only: main.py + eight extras.
        assert_eq!(summary.matches(" bytes)").count(), 9);
        assert_eq!(registry.get().unwrap().full_name(), "acme/widgets");
    }

    #[test]
    fn summary_layout() {
        let mut handle = repo("acme", "tools");
        handle.description = Some("CLI helpers".to_string());
        handle.language = Some("Rust".to_string());
        handle.stars = 3;
        handle.forks = 1;
        let files = [entry("a.rs", EntryKind::File, 10), entry("b.rs", EntryKind::File, 20)];

        assert_eq!(
            format_summary(&handle, &files),
            format!(
                "{SUCCESS_MARKER} Conectado exitosamente al repositorio: tools\n\n\
                 📊 Información del repositorio:\n\
                 • Descripción: CLI helpers\n\
                 • Lenguaje principal: Rust\n\
                 • Estrellas: 3\n\
                 • Forks: 1\n\
                 • Rama principal: main\n\n\
                 📁 Archivos principales:\n\
                 • a.rs (10 bytes)\n\
                 • b.rs (20 bytes)\n"
            )
        );
    }

    #[tokio::test]
    async fn summary_uses_placeholders() {
        let summary = format_summary(&repo("acme", "bare"), &[]);
        assert!(summary.contains("Sin descripción"));
        assert!(summary.contains("No especificado"));
    }

    #[tokio::test]
    async fn not_found_leaves_registry_unchanged() {
        let host = Arc::new(FakeHost::new());
        let registry = Arc::new(ActiveRepository::new());
        registry.set(repo("acme", "previous"));
        let connector = RepositoryConnector::new(host, registry.clone());

        let status = connector.connect("https://github.com/acme/widgets").await;

        assert!(status.starts_with(FAILURE_MARKER));
        assert!(status.contains("404"));
        assert_eq!(registry.get().unwrap().name, "previous");
    }

    #[tokio::test]
    async fn unconfigured_host_reports_missing_token() {
        let host = Arc::new(FakeHost::unconfigured());
        let connector = RepositoryConnector::new(host.clone(), Arc::new(ActiveRepository::new()));

        let status = connector.connect("https://github.com/acme/widgets").await;

        assert_eq!(status, RelayError::RepositoryNotConfigured.user_message());
        assert_eq!(host.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_url_makes_no_calls() {
        let host = Arc::new(FakeHost::new());
        let connector = RepositoryConnector::new(host.clone(), Arc::new(ActiveRepository::new()));

        let status = connector.connect("not a url").await;

        assert!(status.starts_with(FAILURE_MARKER));
        assert_eq!(host.calls(), 0);
    }

    #[tokio::test]
    async fn later_connect_redirects_context_fetches() {
        let host = Arc::new(
            FakeHost::new()
                .with_owned(repo("acme", "first"))
                .with_repository(repo("acme", "second"), Vec::new())
                .with_file("main.py", "pass"),
        );
        let registry = Arc::new(ActiveRepository::new());
        let fetcher = ContextFetcher::new(host.clone(), registry.clone());
        let connector = RepositoryConnector::new(host.clone(), registry);

        let first = fetcher.fetch_context("explica main.py").await.unwrap();
        assert_eq!(first.repository(), "acme/first");

        connector.connect("https://github.com/acme/second").await;

        let second = fetcher.fetch_context("explica main.py").await.unwrap();
        assert_eq!(second.repository(), "acme/second");
    }

    #[tokio::test]
    async fn slow_auto_resolve_does_not_override_connect() {
        let host = Arc::new(
            FakeHost::new()
                .with_owned(repo("acme", "auto"))
                .with_owned_delay(Duration::from_millis(100))
                .with_repository(repo("acme", "explicit"), Vec::new())
                .with_file("main.py", "pass"),
        );
        let registry = Arc::new(ActiveRepository::new());
        let fetcher = Arc::new(ContextFetcher::new(host.clone(), registry.clone()));
        let connector = RepositoryConnector::new(host.clone(), registry.clone());

        let pending = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.fetch_context("explica main.py").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let status = connector.connect("https://github.com/acme/explicit").await;
        assert!(status.starts_with(SUCCESS_MARKER));

        let first = pending.await.unwrap().unwrap();
        assert_eq!(first.repository(), "acme/explicit");
        assert_eq!(registry.get().unwrap().full_name(), "acme/explicit");

        let next = fetcher.fetch_context("explica main.py").await.unwrap();
        assert_eq!(next.repository(), "acme/explicit");
    }
}
