//! Relay configuration types.
//!
//! `RelayConfig` is the full configuration surface: server binding, the
//! inference service, the code-hosting service, and chat limits. Every field
//! has a default so a missing or partial `smartchat.toml` still yields a
//! usable configuration. Loading (file, `.env`, environment) lives in
//! `smartchat-infra`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Preferred model substring used when `preferred_model` is `"auto"`.
pub const AUTO_MODEL_PREFERENCE: &str = "phi3";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,

    /// Base URL of the inference service, e.g. `http://localhost:11434`.
    pub ollama_base_url: String,
    /// Timeout for generate calls, in seconds.
    pub ollama_timeout_secs: u64,
    /// Timeout for model listing and health checks, in seconds.
    pub ollama_list_timeout_secs: u64,
    /// Substring of the preferred model name, or `"auto"`.
    pub preferred_model: String,

    /// Code-hosting access token. Its presence enables repository features.
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
    /// Account whose first repository is used when none is connected.
    /// `None` means the account that owns the token.
    pub github_account: Option<String>,
    pub github_api_base: String,
    pub github_timeout_secs: u64,

    /// Maximum chat message length, in characters.
    pub max_message_length: usize,
    /// Allowed CORS origins. `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_timeout_secs: 30,
            ollama_list_timeout_secs: 5,
            preferred_model: "auto".to_string(),
            github_token: None,
            github_account: None,
            github_api_base: "https://api.github.com".to_string(),
            github_timeout_secs: 10,
            max_message_length: 1000,
            cors_origins: vec!["*".to_string()],
            log_level: "info".to_string(),
        }
    }
}

impl RelayConfig {
    /// Check required settings. Returns one message per problem found.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.ollama_base_url.trim().is_empty() {
            errors.push("OLLAMA_BASE_URL no está configurado".to_string());
        }

        if let Some(token) = &self.github_token {
            if !(token.starts_with("ghp_") || token.starts_with("github_pat_")) {
                errors.push("GITHUB_TOKEN parece ser inválido".to_string());
            }
        }

        if self.port == 0 {
            errors.push("PORT debe estar entre 1 y 65535".to_string());
        }

        errors
    }

    pub fn is_github_enabled(&self) -> bool {
        self.github_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty())
    }

    /// Model-name substring to prefer when selecting a model.
    pub fn model_preference(&self) -> &str {
        let preferred = self.preferred_model.trim();
        if preferred.is_empty() || preferred.eq_ignore_ascii_case("auto") {
            AUTO_MODEL_PREFERENCE
        } else {
            preferred
        }
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Hand-written so the token never shows up in logs.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("debug", &self.debug)
            .field("ollama_base_url", &self.ollama_base_url)
            .field("ollama_timeout_secs", &self.ollama_timeout_secs)
            .field("ollama_list_timeout_secs", &self.ollama_list_timeout_secs)
            .field("preferred_model", &self.preferred_model)
            .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
            .field("github_account", &self.github_account)
            .field("github_api_base", &self.github_api_base)
            .field("github_timeout_secs", &self.github_timeout_secs)
            .field("max_message_length", &self.max_message_length)
            .field("cors_origins", &self.cors_origins)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Join a base URL and an endpoint with exactly one slash between them.
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    if endpoint.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{endpoint}")
    }
}
