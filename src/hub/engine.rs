//! Hub engine
//!
//! The engine owns the room table and is driven by exactly one task. Every
//! change to membership and every fan-out happens inside [`HubEngine::run`],
//! one command at a time, in the order the commands were submitted.
//!
//! Delivery never waits. Each recipient gets a `try_send` on its bounded
//! outbound queue; a full queue marks a slow consumer and a closed queue marks
//! a connection whose pump is gone. Either way the connection is detached
//! from its room and the rest of the room is told it left.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::client::{Connection, ConnectionId};
use crate::hub::Command;
use crate::hub::message::Message;
use crate::hub::room::{MemberInfo, Room, RoomInfo};
use crate::utils::HubError;

#[derive(Debug, Default)]
pub struct HubEngine {
    pub(crate) rooms: HashMap<String, Room>,
    /// Which room each registered connection is in.
    pub(crate) locations: HashMap<ConnectionId, String>,
    echo_to_sender: bool,
}

impl HubEngine {
    pub fn new(echo_to_sender: bool) -> Self {
        Self {
            rooms: HashMap::new(),
            locations: HashMap::new(),
            echo_to_sender,
        }
    }

    pub fn create_room(&mut self, id: &str, name: &str) -> Result<RoomInfo, HubError> {
        if self.rooms.contains_key(id) {
            return Err(HubError::RoomAlreadyExists(id.to_string()));
        }
        let room = Room::new(id, name);
        let info = room.info();
        self.rooms.insert(id.to_string(), room);
        info!(room = id, name, "room created");
        Ok(info)
    }

    /// Admit `connection` into the room named by `connection.room_id` and
    /// announce it to everyone in that room, the newcomer included.
    pub fn register(&mut self, connection: Connection) -> Result<(), HubError> {
        let room_id = connection.room_id.clone();
        if !self.rooms.contains_key(&room_id) {
            return Err(HubError::RoomNotFound(room_id));
        }

        // A connection lives in one room at a time.
        if self.locations.contains_key(&connection.id) {
            self.unregister(&connection.id);
        }

        let id = connection.id.clone();
        let username = connection.identity.username.clone();
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.join(connection);
        }
        self.locations.insert(id.clone(), room_id.clone());
        debug!(room = %room_id, connection = %id, %username, "member joined");

        self.fan_out(Arc::new(Message::join(&room_id, &username)), None);
        Ok(())
    }

    /// Remove a connection and announce its departure. Returns `false` when
    /// the connection was not a member of any room.
    pub fn unregister(&mut self, id: &ConnectionId) -> bool {
        match self.detach(id) {
            Some(connection) => {
                let leave = Message::leave(&connection.room_id, &connection.identity.username);
                drop(connection);
                self.fan_out(Arc::new(leave), None);
                true
            }
            None => false,
        }
    }

    /// Deliver `message` to every member of `message.room_id`.
    ///
    /// When `sender` is given it must still be a member of that room, and it
    /// is skipped unless the engine echoes to senders.
    pub fn broadcast(&mut self, message: Message, sender: Option<&ConnectionId>) {
        if let Some(sender) = sender {
            if self.locations.get(sender) != Some(&message.room_id) {
                debug!(connection = %sender, room = %message.room_id, "dropping message from non-member");
                return;
            }
        }
        let exclude = if self.echo_to_sender {
            None
        } else {
            sender.cloned()
        };
        self.fan_out(Arc::new(message), exclude);
    }

    pub fn rooms(&self) -> Vec<RoomInfo> {
        let mut rooms: Vec<RoomInfo> = self.rooms.values().map(Room::info).collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    pub fn members(&self, room_id: &str) -> Result<Vec<MemberInfo>, HubError> {
        self.rooms
            .get(room_id)
            .map(Room::member_infos)
            .ok_or_else(|| HubError::RoomNotFound(room_id.to_string()))
    }

    pub fn room_of(&self, id: &ConnectionId) -> Option<&str> {
        self.locations.get(id).map(String::as_str)
    }

    fn detach(&mut self, id: &ConnectionId) -> Option<Connection> {
        let room_id = self.locations.remove(id)?;
        let connection = self.rooms.get_mut(&room_id)?.leave(id);
        if connection.is_some() {
            debug!(room = %room_id, connection = %id, "member left");
        }
        connection
    }

    /// Push `message` onto every member queue of its room. Members that cannot
    /// take it are detached, and their `Leave` is delivered after `message`.
    fn fan_out(&mut self, message: Arc<Message>, exclude: Option<ConnectionId>) {
        let mut pending = VecDeque::from([(message, exclude)]);

        while let Some((message, exclude)) = pending.pop_front() {
            let Some(room) = self.rooms.get(&message.room_id) else {
                debug!(room = %message.room_id, "broadcast to unknown room dropped");
                continue;
            };

            let mut dropped = Vec::new();
            for (id, connection) in &room.members {
                if exclude.as_ref() == Some(id) {
                    continue;
                }
                match connection.try_enqueue(message.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!(
                            room = %room.id,
                            connection = %id,
                            username = %connection.identity.username,
                            "outbound queue full, evicting slow consumer"
                        );
                        dropped.push(id.clone());
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!(room = %room.id, connection = %id, "outbound queue closed");
                        dropped.push(id.clone());
                    }
                }
            }

            for id in dropped {
                if let Some(connection) = self.detach(&id) {
                    let leave = Message::leave(&connection.room_id, &connection.identity.username);
                    pending.push_back((Arc::new(leave), None));
                }
            }
        }
    }

    pub(crate) fn handle(&mut self, command: Command) {
        match command {
            Command::CreateRoom { id, name, reply } => {
                let _ = reply.send(self.create_room(&id, &name));
            }
            Command::Register { connection, reply } => {
                let id = connection.id.clone();
                let result = self.register(connection);
                if reply.send(result).is_err() {
                    // Nobody is waiting for this connection any more.
                    self.unregister(&id);
                }
            }
            Command::Unregister { id } => {
                self.unregister(&id);
            }
            Command::Broadcast { message, sender } => {
                self.broadcast(message, sender.as_ref());
            }
            Command::Rooms { reply } => {
                let _ = reply.send(self.rooms());
            }
            Command::Members { room_id, reply } => {
                let _ = reply.send(self.members(&room_id));
            }
        }
    }

    /// Process commands until every [`Hub`](crate::hub::Hub) handle is gone.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        info!("hub control loop stopped");
    }
}
