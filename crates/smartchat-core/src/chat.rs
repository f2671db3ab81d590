//! Streaming chat orchestrator.
//!
//! One chat turn moves through
//! `Started -> AwaitingModelList -> AwaitingContext -> Generating` and ends
//! `Completed` or `Failed`. Every turn that starts emits exactly one terminal
//! `response_end` frame unless the session goes away first.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{Instrument, debug, info, info_span, warn};

use smartchat_types::error::RelayError;
use smartchat_types::frame::OutboundFrame;
use smartchat_types::inference::GenerationEvent;

use crate::codehost::CodeHost;
use crate::context::ContextFetcher;
use crate::inference::{FragmentStream, Generation, InferenceBackend, generate, select_model};
use crate::prompt::build_prompt;
use crate::session::{ClientSession, SessionManager};

/// Content of the `response_start` frame.
pub const PROCESSING_NOTICE: &str = "🤔 Procesando tu mensaje...";

/// How a chat turn finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Upstream reported completion; `chunks` fragments were relayed.
    Completed { chunks: usize },
    /// A terminal error frame was sent.
    Failed(RelayError),
    /// The session closed mid-turn; nothing more can be delivered.
    Aborted,
}

fn single_fragment(text: String) -> FragmentStream {
    Box::pin(futures_util::stream::iter([
        Ok(GenerationEvent::TextDelta(text)),
        Ok(GenerationEvent::Done),
    ]))
}

pub struct ChatOrchestrator<B: InferenceBackend, H: CodeHost> {
    backend: Arc<B>,
    context: ContextFetcher<H>,
    preferred_model: String,
    max_message_length: usize,
}

impl<B: InferenceBackend, H: CodeHost> ChatOrchestrator<B, H> {
    pub fn new(
        backend: Arc<B>,
        context: ContextFetcher<H>,
        preferred_model: impl Into<String>,
        max_message_length: usize,
    ) -> Self {
        Self {
            backend,
            context,
            preferred_model: preferred_model.into(),
            max_message_length,
        }
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    /// Whether `message` fits the configured length limit (in characters).
    pub fn accepts(&self, message: &str) -> bool {
        message.chars().count() <= self.max_message_length
    }

    /// Run one streamed chat turn, relaying frames to `session`.
    pub async fn run_turn(
        &self,
        sessions: &SessionManager,
        session: &ClientSession,
        message: &str,
    ) -> TurnOutcome {
        let span = info_span!("chat_turn", session_id = %session.id(), model = tracing::field::Empty);
        self.run_turn_inner(sessions, session, message)
            .instrument(span)
            .await
    }

    async fn run_turn_inner(
        &self,
        sessions: &SessionManager,
        session: &ClientSession,
        message: &str,
    ) -> TurnOutcome {
        let id = session.id();
        let send = |frame: OutboundFrame| sessions.send(id, frame).is_ok();

        if !self.accepts(message) {
            let err = RelayError::MessageTooLong {
                limit: self.max_message_length,
            };
            debug!(length = message.chars().count(), "Chat message rejected as too long");
            return if send(OutboundFrame::end(err.user_message())) {
                TurnOutcome::Failed(err)
            } else {
                TurnOutcome::Aborted
            };
        }

        if !send(OutboundFrame::start(PROCESSING_NOTICE)) {
            return TurnOutcome::Aborted;
        }

        let fail = |err: RelayError| {
            warn!(error = %err, "Chat turn failed");
            if send(OutboundFrame::end(err.user_message())) {
                TurnOutcome::Failed(err)
            } else {
                TurnOutcome::Aborted
            }
        };

        let model = match self.backend.list_models().await {
            Ok(models) => match select_model(&models, &self.preferred_model) {
                Ok(model) => model.clone(),
                Err(err) => return fail(err),
            },
            Err(err) => return fail(err),
        };
        tracing::Span::current().record("model", model.name.as_str());

        let context = self.context.fetch_context(message).await;
        let prompt = build_prompt(message, context.as_ref());

        let mut stream = match generate(self.backend.as_ref(), &model, &prompt, true).await {
            Ok(Generation::Streaming(stream)) => stream,
            Ok(Generation::Complete(text)) => single_fragment(text),
            Err(err) => return fail(err),
        };

        let mut chunks = 0usize;
        while let Some(event) = stream.next().await {
            match event {
                Ok(GenerationEvent::TextDelta(delta)) => {
                    if delta.is_empty() {
                        continue;
                    }
                    if !send(OutboundFrame::chunk(delta)) {
                        debug!(chunks, "Session closed mid-stream; dropping upstream");
                        return TurnOutcome::Aborted;
                    }
                    chunks += 1;
                }
                Ok(GenerationEvent::Done) => break,
                Err(err) => return fail(err),
            }
        }

        if !send(OutboundFrame::end_ok()) {
            return TurnOutcome::Aborted;
        }
        info!(chunks, with_context = context.is_some(), "Chat turn completed");
        TurnOutcome::Completed { chunks }
    }

    /// Full reply to `message` through the blocking generate path.
    pub async fn reply(&self, message: &str) -> Result<String, RelayError> {
        if !self.accepts(message) {
            return Err(RelayError::MessageTooLong {
                limit: self.max_message_length,
            });
        }
        let models = self.backend.list_models().await?;
        let model = select_model(&models, &self.preferred_model)?;
        let context = self.context.fetch_context(message).await;
        let prompt = build_prompt(message, context.as_ref());

        generate(self.backend.as_ref(), model, &prompt, false)
            .await?
            .into_text()
            .await
    }
}
