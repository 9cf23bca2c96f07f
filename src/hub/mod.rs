//! The hub owns every room and is the only place room membership changes.
//!
//! Callers talk to it through [`Hub`], which submits [`Command`]s to a single
//! [`HubEngine`] task. Registration, removal and fan-out are therefore
//! totally ordered and never race each other.

pub mod engine;
pub mod handle;
pub mod message;
pub mod room;

use tokio::sync::oneshot;

use crate::client::{Connection, ConnectionId};
use crate::utils::HubError;

pub use engine::HubEngine;
pub use handle::Hub;
pub use message::{Message, MessageKind};
pub use room::{MemberInfo, Room, RoomInfo};

/// One event for the control loop.
#[derive(Debug)]
pub enum Command {
    CreateRoom {
        id: String,
        name: String,
        reply: oneshot::Sender<Result<RoomInfo, HubError>>,
    },
    Register {
        connection: Connection,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    Unregister {
        id: ConnectionId,
    },
    Broadcast {
        message: Message,
        sender: Option<ConnectionId>,
    },
    Rooms {
        reply: oneshot::Sender<Vec<RoomInfo>>,
    },
    Members {
        room_id: String,
        reply: oneshot::Sender<Result<Vec<MemberInfo>, HubError>>,
    },
}
