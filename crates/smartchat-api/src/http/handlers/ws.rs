//! WebSocket relay endpoint.
//!
//! `/ws` upgrades to a websocket and opens a relay session. A writer task
//! drains the session's outbound queue into the socket while this task
//! reads client frames and hands them to the relay. Disconnecting removes
//! the session and aborts whatever turn it had in flight.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{Sink, SinkExt, Stream, StreamExt};

use smartchat_core::relay::OpenSession;

use crate::state::AppState;

/// Upgrade an HTTP request to a relay websocket session.
///
/// Mounted at `/ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    let (ws_sender, ws_receiver) = socket.split();
    run_connection(&state, ws_sender, ws_receiver).await;
}

/// Drive one relay session over a split socket until either side closes.
async fn run_connection<Tx, Rx>(state: &AppState, mut ws_sender: Tx, mut ws_receiver: Rx)
where
    Tx: Sink<Message> + Unpin + Send + 'static,
    Rx: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let OpenSession {
        session,
        mut outbound,
        commands,
    } = state.relay.open_session();
    let session_id = session.id();
    tracing::info!(
        %session_id,
        active = state.relay.sessions().len(),
        "WebSocket client connected"
    );

    // Ends when the session is removed from the manager (its queue sender
    // is dropped) or when the client stops accepting frames.
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(err) => {
                    tracing::warn!("Failed to serialize outbound frame: {err}");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });
    let mut writer_done = false;

    loop {
        tokio::select! {
            _ = session.closed() => break,

            // The socket no longer accepts frames.
            _ = &mut writer => {
                writer_done = true;
                break;
            }

            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        state.relay.accept_text(&session, &commands, text.as_str());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!("WebSocket receive error: {err}");
                        break;
                    }
                    // Binary, ping and pong protocol frames.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.relay.close_session(&session);
    if !writer_done {
        if let Err(err) = writer.await {
            tracing::debug!("WebSocket writer task failed: {err}");
        }
    }
    tracing::info!(
        %session_id,
        active = state.relay.sessions().len(),
        "WebSocket client disconnected"
    );
}
