//! Application state wiring.
//!
//! `AppState` is built once at startup and cloned into every axum handler.
//! All fields are `Arc`-wrapped so cloning is cheap.

use std::sync::Arc;

use smartchat_core::relay::Relay;
use smartchat_infra::github::GitHubClient;
use smartchat_infra::ollama::OllamaClient;
use smartchat_types::config::RelayConfig;

/// Relay over the concrete Ollama and GitHub clients.
pub type ConcreteRelay = Relay<OllamaClient, GitHubClient>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub relay: Arc<ConcreteRelay>,
    pub ollama: Arc<OllamaClient>,
    pub github: Arc<GitHubClient>,
}

impl AppState {
    /// Build the upstream clients and the relay from `config`.
    pub fn init(config: RelayConfig) -> anyhow::Result<Self> {
        let ollama = Arc::new(OllamaClient::from_config(&config)?);
        let github = Arc::new(GitHubClient::from_config(&config)?);
        let relay = Arc::new(Relay::new(ollama.clone(), github.clone(), &config));

        tracing::debug!(
            ollama = %ollama.base_url(),
            github = config.is_github_enabled(),
            "Application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            relay,
            ollama,
            github,
        })
    }
}
