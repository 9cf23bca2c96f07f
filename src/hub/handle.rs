use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::auth::Identity;
use crate::client::{Connection, ConnectionHandle, ConnectionId, Registration};
use crate::config::HubSettings;
use crate::hub::Command;
use crate::hub::engine::HubEngine;
use crate::hub::message::Message;
use crate::hub::room::{MemberInfo, RoomInfo};
use crate::utils::HubError;

/// Cloneable front door to the hub control loop.
///
/// Every method turns into one [`Command`] on a bounded channel; the engine
/// task applies them in submission order.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::Sender<Command>,
    outbound_capacity: usize,
}

impl Hub {
    /// Spawn the control loop on the current runtime.
    pub fn start(settings: &HubSettings) -> (Self, JoinHandle<()>) {
        let (commands, rx) = mpsc::channel(settings.command_capacity.max(1));
        let engine = HubEngine::new(settings.echo_to_sender);
        let task = tokio::spawn(engine.run(rx));
        let hub = Self {
            commands,
            outbound_capacity: settings.outbound_capacity,
        };
        (hub, task)
    }

    pub async fn create_room(&self, id: &str, name: &str) -> Result<RoomInfo, HubError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::CreateRoom {
            id: id.to_string(),
            name: name.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| HubError::Closed)?
    }

    /// Admit an authenticated identity into `room_id`. The hub assigns the
    /// connection id.
    pub async fn register(
        &self,
        identity: Identity,
        room_id: &str,
    ) -> Result<Registration, HubError> {
        let (connection, outbound) =
            Connection::new(identity.clone(), room_id, self.outbound_capacity);
        let id = connection.id.clone();

        let (reply, rx) = oneshot::channel();
        self.submit(Command::Register { connection, reply }).await?;
        rx.await.map_err(|_| HubError::Closed)??;

        Ok(Registration {
            handle: ConnectionHandle::new(id, identity, room_id, self.clone()),
            outbound,
        })
    }

    /// Remove a connection. Unknown or already removed ids are a no-op.
    pub async fn unregister(&self, id: &ConnectionId) {
        if let Err(e) = self.submit(Command::Unregister { id: id.clone() }).await {
            warn!(connection = %id, error = %e, "unregister not delivered");
        }
    }

    /// Deliver `message` to every member of its room.
    pub async fn broadcast(&self, message: Message) {
        self.broadcast_from(message, None).await;
    }

    pub(crate) async fn broadcast_from(&self, message: Message, sender: Option<ConnectionId>) {
        if let Err(e) = self.submit(Command::Broadcast { message, sender }).await {
            warn!(error = %e, "broadcast not delivered");
        }
    }

    pub async fn rooms(&self) -> Result<Vec<RoomInfo>, HubError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Rooms { reply }).await?;
        rx.await.map_err(|_| HubError::Closed)
    }

    pub async fn members(&self, room_id: &str) -> Result<Vec<MemberInfo>, HubError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Members {
            room_id: room_id.to_string(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| HubError::Closed)?
    }

    pub async fn room_exists(&self, room_id: &str) -> Result<bool, HubError> {
        match self.members(room_id).await {
            Ok(_) => Ok(true),
            Err(HubError::RoomNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn submit(&self, command: Command) -> Result<(), HubError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| HubError::Closed)
    }
}
