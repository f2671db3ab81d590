//! Frames exchanged with a browser client over the websocket channel.
//!
//! Both directions are serde-tagged JSON objects: `{"type": "...", ...}`.

use serde::{Deserialize, Serialize};

/// Frame received from a browser client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// A chat message to relay to the inference service.
    Chat {
        message: String,
        /// Opaque client timestamp; accepted and ignored.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<serde_json::Value>,
    },
    /// Connect a code-hosting repository as the active context source.
    GithubConnect { repo_url: String },
    /// Keep-alive ping. Answered with [`OutboundFrame::Pong`].
    Ping,
}

/// Frame sent to a browser client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Processing of a chat turn has begun.
    ResponseStart { content: String },
    /// One generated text fragment.
    ResponseChunk { content: String },
    /// Terminal frame of a chat turn. Empty on success, error text on failure.
    ResponseEnd { content: String },
    /// Result of a repository connect, success or failure alike.
    GithubStatus { content: String },
    Pong,
}

impl OutboundFrame {
    pub fn start(content: impl Into<String>) -> Self {
        OutboundFrame::ResponseStart {
            content: content.into(),
        }
    }

    pub fn chunk(content: impl Into<String>) -> Self {
        OutboundFrame::ResponseChunk {
            content: content.into(),
        }
    }

    pub fn end(content: impl Into<String>) -> Self {
        OutboundFrame::ResponseEnd {
            content: content.into(),
        }
    }

    /// Successful end of a turn (empty content).
    pub fn end_ok() -> Self {
        Self::end(String::new())
    }

    pub fn github_status(content: impl Into<String>) -> Self {
        OutboundFrame::GithubStatus {
            content: content.into(),
        }
    }

    /// Whether this frame closes a chat turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutboundFrame::ResponseEnd { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_frame_with_timestamp() {
        let json = r#"{"type":"chat","message":"hola","timestamp":"2024-01-01T00:00:00Z"}"#;
        let frame: InboundFrame = serde_json::from_str(json).unwrap();
        match frame {
            InboundFrame::Chat { message, timestamp } => {
                assert_eq!(message, "hola");
                assert!(timestamp.is_some());
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_chat_frame_without_timestamp() {
        let frame: InboundFrame =
            serde_json::from_str(r#"{"type":"chat","message":"hola"}"#).unwrap();
        assert_eq!(
            frame,
            InboundFrame::Chat {
                message: "hola".to_string(),
                timestamp: None,
            }
        );
    }

    #[test]
    fn test_github_connect_frame() {
        let frame: InboundFrame = serde_json::from_str(
            r#"{"type":"github_connect","repo_url":"https://github.com/acme/widgets"}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            InboundFrame::GithubConnect {
                repo_url: "https://github.com/acme/widgets".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_frame_type_is_rejected() {
        let result = serde_json::from_str::<InboundFrame>(r#"{"type":"shutdown"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_outbound_frame_shapes() {
        let json = serde_json::to_value(OutboundFrame::chunk("Hola")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "response_chunk", "content": "Hola"}));

        let json = serde_json::to_value(OutboundFrame::end_ok()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "response_end", "content": ""}));

        let json = serde_json::to_value(OutboundFrame::github_status("ok")).unwrap();
        assert_eq!(json["type"], "github_status");

        let json = serde_json::to_value(OutboundFrame::Pong).unwrap();
        assert_eq!(json, serde_json::json!({"type": "pong"}));
    }

    #[test]
    fn test_only_response_end_is_terminal() {
        assert!(OutboundFrame::end("x").is_terminal());
        assert!(!OutboundFrame::start("x").is_terminal());
        assert!(!OutboundFrame::chunk("x").is_terminal());
        assert!(!OutboundFrame::github_status("x").is_terminal());
    }
}
