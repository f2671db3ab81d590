//! Session connection manager.
//!
//! Tracks every open bidirectional client session in a `DashMap` keyed by
//! session id. Each entry holds the sender half of the session's outbound
//! frame queue; the transport layer drains the receiver half into the socket.
//! A session is in the map exactly while its queue is writable: a failed
//! send removes it.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use smartchat_types::error::SessionError;
use smartchat_types::frame::OutboundFrame;

/// Handle to one connected client session.
///
/// Cloning shares the same identity and cancellation token.
#[derive(Debug, Clone)]
pub struct ClientSession {
    id: Uuid,
    cancel: CancellationToken,
}

impl ClientSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the session has been disconnected.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the session is disconnected.
    pub async fn closed(&self) {
        self.cancel.cancelled().await
    }
}

struct SessionSlot {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    cancel: CancellationToken,
}

#[derive(Default)]
pub struct SessionManager {
    active: DashMap<Uuid, SessionSlot>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session whose transport handshake has completed.
    ///
    /// Returns the session handle and the receiver for its outbound frames.
    pub fn connect(&self) -> (ClientSession, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let session = ClientSession {
            id: Uuid::now_v7(),
            cancel: CancellationToken::new(),
        };
        self.active.insert(
            session.id,
            SessionSlot {
                outbound,
                cancel: session.cancel.clone(),
            },
        );
        tracing::debug!(session_id = %session.id, active = self.active.len(), "Session connected");
        (session, rx)
    }

    /// Remove a session and cancel its in-flight work.
    ///
    /// Idempotent: removing an absent session is a no-op. Returns whether the
    /// session was present.
    pub fn disconnect(&self, id: Uuid) -> bool {
        match self.active.remove(&id) {
            Some((_, slot)) => {
                slot.cancel.cancel();
                tracing::debug!(session_id = %id, active = self.active.len(), "Session disconnected");
                true
            }
            None => false,
        }
    }

    /// Queue one frame for the session.
    pub fn send(&self, id: Uuid, frame: OutboundFrame) -> Result<(), SessionError> {
        let result = match self.active.get(&id) {
            Some(slot) => slot.outbound.send(frame).map_err(|_| SessionError::Closed(id)),
            None => return Err(SessionError::NotFound(id)),
        };

        // The guard from `get` is dropped above; removing while holding it
        // would deadlock the shard.
        if result.is_err() {
            self.disconnect(id);
        }
        result
    }

    pub fn is_active(&self, id: Uuid) -> bool {
        self.active.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("active", &self.active.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_registers_session() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.connect();
        assert!(manager.is_active(session.id()));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let manager = SessionManager::new();
        let (a, _rx_a) = manager.connect();
        let (b, _rx_b) = manager.connect();
        assert_ne!(a.id(), b.id());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn disconnect_twice_is_a_noop() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.connect();
        assert!(manager.disconnect(session.id()));
        assert!(!manager.disconnect(session.id()));
        assert!(manager.is_empty());
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn send_routes_to_the_right_session() {
        let manager = SessionManager::new();
        let (a, mut rx_a) = manager.connect();
        let (_b, mut rx_b) = manager.connect();

        manager.send(a.id(), OutboundFrame::chunk("para a")).unwrap();

        assert_eq!(rx_a.recv().await, Some(OutboundFrame::chunk("para a")));
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn send_to_unknown_session_reports_not_found() {
        let manager = SessionManager::new();
        let id = Uuid::now_v7();
        assert_eq!(
            manager.send(id, OutboundFrame::Pong),
            Err(SessionError::NotFound(id))
        );
    }

    #[test]
    fn send_to_closed_channel_reports_and_removes() {
        let manager = SessionManager::new();
        let (session, rx) = manager.connect();
        drop(rx);

        assert_eq!(
            manager.send(session.id(), OutboundFrame::Pong),
            Err(SessionError::Closed(session.id()))
        );
        assert!(!manager.is_active(session.id()));
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn disconnect_wakes_closed_waiters() {
        let manager = SessionManager::new();
        let (session, _rx) = manager.connect();
        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.closed().await })
        };
        manager.disconnect(session.id());
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_connect_and_disconnect() {
        let manager = std::sync::Arc::new(SessionManager::new());
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let manager = manager.clone();
            tasks.push(tokio::spawn(async move {
                let (session, _rx) = manager.connect();
                manager.disconnect(session.id());
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert!(manager.is_empty());
    }
}
