//! In-memory fakes for the port traits, shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures_util::StreamExt;

use smartchat_types::error::RelayError;
use smartchat_types::inference::{GenerationEvent, InferenceModel};
use smartchat_types::repository::{EntryKind, RepoEntry, RepoFile, RepositoryHandle};

use crate::codehost::CodeHost;
use crate::inference::{FragmentStream, InferenceBackend};

pub fn repo(owner: &str, name: &str) -> RepositoryHandle {
    RepositoryHandle {
        owner: owner.to_string(),
        name: name.to_string(),
        default_branch: "main".to_string(),
        description: None,
        language: None,
        stars: 0,
        forks: 0,
        size: 0,
    }
}

pub fn entry(name: &str, kind: EntryKind, size: u64) -> RepoEntry {
    RepoEntry {
        name: name.to_string(),
        path: name.to_string(),
        kind,
        size,
    }
}

pub struct FakeBackend {
    models: Vec<InferenceModel>,
    fragments: Vec<String>,
    list_error: Option<RelayError>,
    stream_error_after: Option<(usize, RelayError)>,
    fragment_delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new(models: &[&str], fragments: &[&str]) -> Self {
        Self {
            models: models.iter().map(|n| InferenceModel::new(*n, 1)).collect(),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            list_error: None,
            stream_error_after: None,
            fragment_delay: None,
            prompts: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_list(error: RelayError) -> Self {
        Self {
            list_error: Some(error),
            ..Self::new(&[], &[])
        }
    }

    /// Fail the stream with `error` after `count` fragments.
    pub fn with_stream_error_after(mut self, count: usize, error: RelayError) -> Self {
        self.stream_error_after = Some((count, error));
        self
    }

    pub fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl InferenceBackend for FakeBackend {
    async fn list_models(&self) -> Result<Vec<InferenceModel>, RelayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.list_error {
            return Err(err.clone());
        }
        if self.models.is_empty() {
            return Err(RelayError::NoModelsAvailable);
        }
        Ok(self.models.clone())
    }

    async fn complete(&self, _model: &str, prompt: &str) -> Result<String, RelayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.fragments.concat())
    }

    fn stream(&self, _model: &str, prompt: &str) -> FragmentStream {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut events: Vec<Result<GenerationEvent, RelayError>> = self
            .fragments
            .iter()
            .cloned()
            .map(|f| Ok(GenerationEvent::TextDelta(f)))
            .collect();
        match &self.stream_error_after {
            Some((count, err)) => {
                events.truncate(*count);
                events.push(Err(err.clone()));
            }
            None => events.push(Ok(GenerationEvent::Done)),
        }

        let delay = self.fragment_delay;
        Box::pin(futures_util::stream::iter(events).then(move |event| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            event
        }))
    }
}

pub struct FakeHost {
    configured: bool,
    owned: Option<RepositoryHandle>,
    owned_delay: Option<Duration>,
    repositories: HashMap<String, (RepositoryHandle, Vec<RepoEntry>)>,
    files: HashMap<String, String>,
    calls: AtomicUsize,
    file_requests: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            configured: true,
            owned: None,
            owned_delay: None,
            repositories: HashMap::new(),
            files: HashMap::new(),
            calls: AtomicUsize::new(0),
            file_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    pub fn with_owned(mut self, handle: RepositoryHandle) -> Self {
        self.owned = Some(handle);
        self
    }

    /// Delay `first_owned_repository` answers by `delay`.
    pub fn with_owned_delay(mut self, delay: Duration) -> Self {
        self.owned_delay = Some(delay);
        self
    }

    pub fn with_repository(mut self, handle: RepositoryHandle, entries: Vec<RepoEntry>) -> Self {
        self.repositories
            .insert(handle.full_name(), (handle, entries));
        self
    }

    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.files.insert(path.to_string(), STANDARD.encode(text));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn file_requests(&self) -> Vec<String> {
        self.file_requests.lock().unwrap().clone()
    }

    fn record(&self) -> Result<(), RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.configured {
            Ok(())
        } else {
            Err(RelayError::RepositoryNotConfigured)
        }
    }

    fn not_found() -> RelayError {
        RelayError::UpstreamError {
            status: 404,
            message: "Not Found".to_string(),
        }
    }
}

impl CodeHost for FakeHost {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn repository(&self, owner: &str, name: &str) -> Result<RepositoryHandle, RelayError> {
        self.record()?;
        self.repositories
            .get(&format!("{owner}/{name}"))
            .map(|(handle, _)| handle.clone())
            .ok_or_else(Self::not_found)
    }

    async fn first_owned_repository(&self) -> Result<RepositoryHandle, RelayError> {
        self.record()?;
        if let Some(delay) = self.owned_delay {
            tokio::time::sleep(delay).await;
        }
        self.owned.clone().ok_or_else(Self::not_found)
    }

    async fn list_root(&self, repo: &RepositoryHandle) -> Result<Vec<RepoEntry>, RelayError> {
        self.record()?;
        Ok(self
            .repositories
            .get(&repo.full_name())
            .map(|(_, entries)| entries.clone())
            .unwrap_or_default())
    }

    async fn file(&self, repo: &RepositoryHandle, path: &str) -> Result<RepoFile, RelayError> {
        self.record()?;
        self.file_requests
            .lock()
            .unwrap()
            .push(format!("{}:{path}", repo.full_name()));
        self.files
            .get(path)
            .map(|content| RepoFile {
                path: path.to_string(),
                kind: EntryKind::File,
                encoding: Some("base64".to_string()),
                content: content.clone(),
            })
            .ok_or_else(Self::not_found)
    }
}
