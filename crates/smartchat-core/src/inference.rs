//! InferenceBackend trait and model selection.
//!
//! Uses RPITIT for `list_models` and `complete`, and `Pin<Box<dyn Stream>>`
//! for `stream` so the returned fragment stream is `'static` and can outlive
//! the borrow of the backend.

use std::future::Future;
use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use smartchat_types::error::RelayError;
use smartchat_types::inference::{GenerationEvent, InferenceModel};

/// Lazy, finite, non-restartable sequence of generation events.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<GenerationEvent, RelayError>> + Send + 'static>>;

/// Trait for inference service backends.
///
/// Implementations live in smartchat-infra (e.g., `OllamaClient`). Every call
/// must carry its own timeout; a timed-out call is
/// [`RelayError::UpstreamUnavailable`].
pub trait InferenceBackend: Send + Sync {
    /// List available models, in the order the service returns them.
    ///
    /// Fails with `NoModelsAvailable` when the list is empty.
    fn list_models(&self) -> impl Future<Output = Result<Vec<InferenceModel>, RelayError>> + Send;

    /// Generate the full response in one blocking call.
    fn complete(
        &self,
        model: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, RelayError>> + Send;

    /// Open a chunked generation. Connection and status failures surface as
    /// the first item of the stream.
    fn stream(&self, model: &str, prompt: &str) -> FragmentStream;
}

/// Result of [`generate`]: either the full text or a live fragment stream.
pub enum Generation {
    Complete(String),
    Streaming(FragmentStream),
}

impl Generation {
    /// Drain into the full response text.
    pub async fn into_text(self) -> Result<String, RelayError> {
        match self {
            Generation::Complete(text) => Ok(text),
            Generation::Streaming(stream) => collect_text(stream).await,
        }
    }
}

/// Generate a completion with `model`, blocking or streaming.
pub async fn generate<B: InferenceBackend>(
    backend: &B,
    model: &InferenceModel,
    prompt: &str,
    streaming: bool,
) -> Result<Generation, RelayError> {
    if streaming {
        Ok(Generation::Streaming(backend.stream(&model.name, prompt)))
    } else {
        backend
            .complete(&model.name, prompt)
            .await
            .map(Generation::Complete)
    }
}

/// Concatenate every text delta of `stream` until `Done` or end of stream.
pub async fn collect_text(mut stream: FragmentStream) -> Result<String, RelayError> {
    let mut text = String::new();
    while let Some(event) = stream.next().await {
        match event? {
            GenerationEvent::TextDelta(delta) => text.push_str(&delta),
            GenerationEvent::Done => break,
        }
    }
    Ok(text)
}

/// Pick the model to use from `models`.
///
/// Returns the first model whose name contains `preferred` (case-sensitive),
/// otherwise the first model in list order.
pub fn select_model<'a>(
    models: &'a [InferenceModel],
    preferred: &str,
) -> Result<&'a InferenceModel, RelayError> {
    models
        .iter()
        .find(|model| !preferred.is_empty() && model.name.contains(preferred))
        .or_else(|| models.first())
        .ok_or(RelayError::NoModelsAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    fn models(names: &[&str]) -> Vec<InferenceModel> {
        names.iter().map(|n| InferenceModel::new(*n, 1)).collect()
    }

    #[test]
    fn select_model_prefers_substring_match_over_first() {
        let list = models(&["llama3:8b", "mistral", "phi3:mini"]);
        let selected = select_model(&list, "phi3").unwrap();
        assert_eq!(selected.name, "phi3:mini");
    }

    #[test]
    fn select_model_falls_back_to_first() {
        let list = models(&["llama3:8b", "mistral"]);
        assert_eq!(select_model(&list, "phi3").unwrap().name, "llama3:8b");
    }

    #[test]
    fn select_model_is_case_sensitive() {
        let list = models(&["llama3", "PHI3"]);
        assert_eq!(select_model(&list, "phi3").unwrap().name, "llama3");
    }

    #[test]
    fn select_model_is_deterministic() {
        let list = models(&["a", "phi3-a", "phi3-b"]);
        let first = select_model(&list, "phi3").unwrap().clone();
        let second = select_model(&list, "phi3").unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(first.name, "phi3-a");
    }

    #[test]
    fn select_model_empty_list_fails() {
        assert_eq!(select_model(&[], "phi3"), Err(RelayError::NoModelsAvailable));
    }

    #[tokio::test]
    async fn streamed_fragments_concatenate_to_blocking_response() {
        let backend = FakeBackend::new(&["phi3"], &["Hola", ", ", "mundo", "!"]);
        let model = InferenceModel::new("phi3", 1);

        let blocking = generate(&backend, &model, "prompt", false)
            .await
            .unwrap()
            .into_text()
            .await
            .unwrap();
        let streamed = generate(&backend, &model, "prompt", true)
            .await
            .unwrap()
            .into_text()
            .await
            .unwrap();

        assert_eq!(blocking, "Hola, mundo!");
        assert_eq!(streamed, blocking);
    }

    #[tokio::test]
    async fn collect_text_stops_at_done() {
        let stream: FragmentStream = Box::pin(futures_util::stream::iter(vec![
            Ok(GenerationEvent::TextDelta("a".to_string())),
            Ok(GenerationEvent::Done),
            Ok(GenerationEvent::TextDelta("ignored".to_string())),
        ]));
        assert_eq!(collect_text(stream).await.unwrap(), "a");
    }

    #[tokio::test]
    async fn collect_text_propagates_stream_error() {
        let stream: FragmentStream = Box::pin(futures_util::stream::iter(vec![
            Ok(GenerationEvent::TextDelta("a".to_string())),
            Err(RelayError::UpstreamUnavailable("reset".to_string())),
        ]));
        assert!(matches!(
            collect_text(stream).await,
            Err(RelayError::UpstreamUnavailable(_))
        ));
    }
}
