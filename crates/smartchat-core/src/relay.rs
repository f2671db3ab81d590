//! Per-session frame dispatch.
//!
//! [`Relay`] owns the session manager and both orchestrators. Each opened
//! session gets a turn worker that consumes a bounded command queue, so chat
//! turns and repository connects of one session run strictly one at a time
//! and in arrival order, while distinct sessions run concurrently.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{Instrument, debug, info_span, warn};

use smartchat_types::config::RelayConfig;
use smartchat_types::error::FAILURE_MARKER;
use smartchat_types::frame::{InboundFrame, OutboundFrame};

use crate::chat::ChatOrchestrator;
use crate::codehost::CodeHost;
use crate::connect::RepositoryConnector;
use crate::context::ContextFetcher;
use crate::inference::InferenceBackend;
use crate::registry::ActiveRepository;
use crate::session::{ClientSession, SessionManager};

/// Pending commands a session may queue before new frames are rejected.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// Work item for a session's turn worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Chat(String),
    Connect(String),
}

/// A freshly opened session and its two queue ends.
pub struct OpenSession {
    pub session: ClientSession,
    /// Frames to write to the client, in order.
    pub outbound: mpsc::UnboundedReceiver<OutboundFrame>,
    /// Feed for the session's turn worker.
    pub commands: mpsc::Sender<SessionCommand>,
}

pub fn invalid_frame_message() -> String {
    format!("{FAILURE_MARKER} Error: Formato de mensaje no válido")
}

pub fn queue_full_message() -> String {
    format!(
        "{FAILURE_MARKER} Error: Hay demasiados mensajes pendientes. \
         Espera a que termine la respuesta actual."
    )
}

pub struct Relay<B: InferenceBackend, H: CodeHost> {
    sessions: SessionManager,
    chat: ChatOrchestrator<B, H>,
    connector: RepositoryConnector<H>,
    registry: Arc<ActiveRepository>,
    queue_capacity: usize,
}

impl<B, H> Relay<B, H>
where
    B: InferenceBackend + 'static,
    H: CodeHost + 'static,
{
    pub fn new(backend: Arc<B>, host: Arc<H>, config: &RelayConfig) -> Self {
        let registry = Arc::new(ActiveRepository::new());
        let context = ContextFetcher::new(host.clone(), registry.clone());
        Self {
            sessions: SessionManager::new(),
            chat: ChatOrchestrator::new(
                backend,
                context,
                config.model_preference(),
                config.max_message_length,
            ),
            connector: RepositoryConnector::new(host, registry.clone()),
            registry,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn chat(&self) -> &ChatOrchestrator<B, H> {
        &self.chat
    }

    pub fn registry(&self) -> &Arc<ActiveRepository> {
        &self.registry
    }

    /// Register a session and spawn its turn worker.
    pub fn open_session(self: &Arc<Self>) -> OpenSession {
        let (session, outbound) = self.sessions.connect();
        let (commands, rx) = mpsc::channel(self.queue_capacity);

        let span = info_span!("session", session_id = %session.id());
        tokio::spawn(
            self.clone()
                .run_worker(session.clone(), rx)
                .instrument(span),
        );

        OpenSession {
            session,
            outbound,
            commands,
        }
    }

    /// Remove the session and cancel whatever its worker is doing.
    pub fn close_session(&self, session: &ClientSession) {
        self.sessions.disconnect(session.id());
    }

    /// Handle one raw text frame from the client.
    ///
    /// Never fails: malformed frames and a full queue are answered with an
    /// error `response_end` and the session stays open.
    pub fn accept_text(
        &self,
        session: &ClientSession,
        commands: &mpsc::Sender<SessionCommand>,
        text: &str,
    ) {
        match serde_json::from_str::<InboundFrame>(text) {
            Ok(frame) => self.accept_frame(session, commands, frame),
            Err(err) => {
                warn!(session_id = %session.id(), error = %err, "Invalid inbound frame");
                self.reply(session, OutboundFrame::end(invalid_frame_message()));
            }
        }
    }

    pub fn accept_frame(
        &self,
        session: &ClientSession,
        commands: &mpsc::Sender<SessionCommand>,
        frame: InboundFrame,
    ) {
        let command = match frame {
            InboundFrame::Ping => {
                self.reply(session, OutboundFrame::Pong);
                return;
            }
            InboundFrame::Chat { message, .. } => SessionCommand::Chat(message),
            InboundFrame::GithubConnect { repo_url } => SessionCommand::Connect(repo_url),
        };

        match commands.try_send(command) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(session_id = %session.id(), "Command queue full, rejecting frame");
                self.reply(session, OutboundFrame::end(queue_full_message()));
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(session_id = %session.id(), "Worker gone, dropping frame");
            }
        }
    }

    fn reply(&self, session: &ClientSession, frame: OutboundFrame) {
        if let Err(err) = self.sessions.send(session.id(), frame) {
            debug!(error = %err, "Reply not delivered");
        }
    }

    async fn run_worker(
        self: Arc<Self>,
        session: ClientSession,
        mut commands: mpsc::Receiver<SessionCommand>,
    ) {
        loop {
            let command = tokio::select! {
                biased;
                _ = session.closed() => break,
                command = commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            tokio::select! {
                biased;
                _ = session.closed() => {
                    debug!("Session closed during command, aborting");
                    break;
                }
                _ = self.execute(&session, command) => {}
            }
        }
        debug!("Turn worker stopped");
    }

    async fn execute(&self, session: &ClientSession, command: SessionCommand) {
        match command {
            SessionCommand::Chat(message) => {
                self.chat.run_turn(&self.sessions, session, &message).await;
            }
            SessionCommand::Connect(repo_url) => {
                let status = self.connector.connect(&repo_url).await;
                self.reply(session, OutboundFrame::github_status(status));
            }
        }
    }
}
