use thiserror::Error;
use uuid::Uuid;

/// Marker prefixed to every user-facing failure message.
pub const FAILURE_MARKER: &str = "❌";

/// Marker prefixed to user-facing success messages.
pub const SUCCESS_MARKER: &str = "✅";

/// Errors from the inference service, the code-hosting service, or the
/// relay pipeline between them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream returned HTTP {status}: {message}")]
    UpstreamError { status: u16, message: String },

    #[error("no models available")]
    NoModelsAvailable,

    #[error("invalid repository URL: '{0}'")]
    InvalidRepositoryUrl(String),

    #[error("repository access not configured")]
    RepositoryNotConfigured,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("message exceeds {limit} characters")]
    MessageTooLong { limit: usize },
}

impl RelayError {
    /// Short, human-readable form shown to the chat user.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::UpstreamUnavailable(detail) => {
                format!("{FAILURE_MARKER} Error de conexión: servicio no disponible ({detail})")
            }
            RelayError::UpstreamError { status, .. } => {
                format!("{FAILURE_MARKER} Error: el servicio respondió con estado {status}")
            }
            RelayError::NoModelsAvailable => format!(
                "{FAILURE_MARKER} Error: No hay modelos disponibles en Ollama. \
                 Por favor, descarga un modelo primero."
            ),
            RelayError::InvalidRepositoryUrl(_) => {
                format!("{FAILURE_MARKER} Error: URL de GitHub inválida")
            }
            RelayError::RepositoryNotConfigured => format!(
                "{FAILURE_MARKER} Error: Token de GitHub no configurado. \
                 Por favor, configura GITHUB_TOKEN en el archivo .env"
            ),
            RelayError::Decode(detail) => {
                format!("{FAILURE_MARKER} Error: respuesta ilegible ({detail})")
            }
            RelayError::MessageTooLong { limit } => {
                format!("{FAILURE_MARKER} Error: El mensaje supera el máximo de {limit} caracteres")
            }
        }
    }

    /// Whether the failure happened before any upstream was reached.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            RelayError::InvalidRepositoryUrl(_)
                | RelayError::RepositoryNotConfigured
                | RelayError::MessageTooLong { .. }
        )
    }
}

/// Errors from writing to a client session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} is not connected")]
    NotFound(Uuid),

    #[error("session {0} outbound channel is closed")]
    Closed(Uuid),
}
