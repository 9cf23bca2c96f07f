//! Connection representation
//!
//! `Connection` is the hub-side record of one joined client: its verified
//! identity, the room it belongs to, and the producer end of its bounded
//! outbound queue. Once registered it is owned by the hub's room table; the
//! consumer end (`Outbound`) belongs to the connection's outbound pump.
//!
//! Dropping a `Connection` closes its queue. The pump then drains what is
//! left and sees the end of the stream.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::auth::Identity;
use crate::hub::Message;

pub type ConnectionId = String;

/// Consumer end of a connection's outbound queue.
pub type Outbound = mpsc::Receiver<Arc<Message>>;

#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Identity,
    pub room_id: String,
    outbound: mpsc::Sender<Arc<Message>>,
}

impl Connection {
    /// Create a connection with a fresh UUID and an outbound queue holding at
    /// most `capacity` messages.
    pub fn new(identity: Identity, room_id: &str, capacity: usize) -> (Self, Outbound) {
        Self::with_id(Uuid::new_v4().to_string(), identity, room_id, capacity)
    }

    pub fn with_id(
        id: ConnectionId,
        identity: Identity,
        room_id: &str,
        capacity: usize,
    ) -> (Self, Outbound) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let connection = Self {
            id,
            identity,
            room_id: room_id.to_string(),
            outbound: tx,
        };
        (connection, rx)
    }

    /// Push without waiting. Fails with `Full` for a slow consumer and with
    /// `Closed` once the outbound pump has gone away.
    pub fn try_enqueue(&self, message: Arc<Message>) -> Result<(), TrySendError<Arc<Message>>> {
        self.outbound.try_send(message)
    }
}
