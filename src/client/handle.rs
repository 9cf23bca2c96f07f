use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::auth::Identity;
use crate::client::{ConnectionId, Outbound};
use crate::hub::{Hub, Message};

/// Pump-side handle to a registered connection.
///
/// Clones share the same unregister flag, so whichever pump notices the end
/// of the connection first submits the `Unregister` and the other one is a
/// local no-op.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub identity: Identity,
    pub room_id: String,
    hub: Hub,
    unregistered: Arc<AtomicBool>,
}

/// What a successful register hands back: the handle and the consumer end of
/// the outbound queue.
#[derive(Debug)]
pub struct Registration {
    pub handle: ConnectionHandle,
    pub outbound: Outbound,
}

impl ConnectionHandle {
    pub(crate) fn new(id: ConnectionId, identity: Identity, room_id: &str, hub: Hub) -> Self {
        Self {
            id,
            identity,
            room_id: room_id.to_string(),
            hub,
            unregistered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Submit a chat message from this connection to its room.
    pub async fn send(&self, content: impl Into<String>) {
        let message = Message::chat(&self.room_id, &self.identity.username, content);
        self.hub.broadcast_from(message, Some(self.id.clone())).await;
    }

    pub async fn unregister(&self) {
        if !self.unregistered.swap(true, Ordering::SeqCst) {
            self.hub.unregister(&self.id).await;
        }
    }

    pub fn is_unregistered(&self) -> bool {
        self.unregistered.load(Ordering::SeqCst)
    }
}
