//! OllamaClient -- concrete [`InferenceBackend`] for a local Ollama server.
//!
//! Talks to the native API (`/api/tags`, `/api/generate`). No
//! authentication. Listing uses the short timeout, generation the long one.

pub mod streaming;
pub mod types;

use std::time::Duration;

use smartchat_core::inference::{FragmentStream, InferenceBackend};
use smartchat_types::config::{RelayConfig, join_url};
use smartchat_types::error::RelayError;
use smartchat_types::inference::InferenceModel;

use crate::http::{build_client, map_transport_error, status_error};
use streaming::create_generate_stream;
use types::{GenerateChunk, GenerateRequest, TagsResponse};

pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    list_timeout: Duration,
    generate_timeout: Duration,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        list_timeout: Duration,
        generate_timeout: Duration,
    ) -> Result<Self, RelayError> {
        let base_url: String = base_url.into();
        Ok(Self {
            client: build_client(concat!("smartchat/", env!("CARGO_PKG_VERSION")))?,
            base_url: base_url.trim_end_matches('/').to_string(),
            list_timeout,
            generate_timeout,
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        Self::new(
            config.ollama_base_url.clone(),
            Duration::from_secs(config.ollama_list_timeout_secs),
            Duration::from_secs(config.ollama_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        join_url(&self.base_url, endpoint)
    }

    /// Whether the service answers the model listing with a success status.
    pub async fn ping(&self) -> bool {
        match self
            .client
            .get(self.url("api/tags"))
            .timeout(self.list_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Ollama health check failed");
                false
            }
        }
    }
}

impl InferenceBackend for OllamaClient {
    async fn list_models(&self) -> Result<Vec<InferenceModel>, RelayError> {
        let response = self
            .client
            .get(self.url("api/tags"))
            .timeout(self.list_timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamUnavailable(format!("HTTP {status}")));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Decode(format!("model list: {e}")))?;

        let models: Vec<InferenceModel> = tags.models.into_iter().map(Into::into).collect();
        tracing::debug!(count = models.len(), "Listed Ollama models");
        if models.is_empty() {
            return Err(RelayError::NoModelsAvailable);
        }
        Ok(models)
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<String, RelayError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };
        let response = self
            .client
            .post(self.url("api/generate"))
            .timeout(self.generate_timeout)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let chunk: GenerateChunk = response
            .json()
            .await
            .map_err(|e| RelayError::Decode(format!("generate response: {e}")))?;
        if let Some(error) = chunk.error {
            return Err(RelayError::UpstreamUnavailable(error));
        }
        Ok(chunk.response)
    }

    fn stream(&self, model: &str, prompt: &str) -> FragmentStream {
        create_generate_stream(
            &self.client,
            &self.url("api/generate"),
            model,
            prompt,
            self.generate_timeout,
        )
    }
}
