//! Room membership
//!
//! A `Room` holds the connections currently joined to it, keyed by the
//! hub-assigned connection id. Rooms are plain data: only the hub engine
//! creates them or changes their member set.

use std::collections::HashMap;

use serde::Serialize;

use crate::client::{Connection, ConnectionId};

#[derive(Debug)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub members: HashMap<ConnectionId, Connection>,
}

/// Read-only summary of a room handed out by hub queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInfo {
    pub id: String,
    pub name: String,
    pub members: usize,
}

/// Read-only summary of one member handed out by hub queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    #[serde(rename = "id")]
    pub user_id: String,
    pub username: String,
}

impl Room {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            members: HashMap::new(),
        }
    }

    /// Add a member. An existing entry under the same id is replaced.
    pub fn join(&mut self, connection: Connection) {
        self.members.insert(connection.id.clone(), connection);
    }

    /// Remove a member, handing it back if it was present.
    pub fn leave(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.members.remove(id)
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            members: self.members.len(),
        }
    }

    pub fn member_infos(&self) -> Vec<MemberInfo> {
        let mut members: Vec<MemberInfo> = self
            .members
            .values()
            .map(|c| MemberInfo {
                user_id: c.identity.user_id.clone(),
                username: c.identity.username.clone(),
            })
            .collect();
        members.sort_by(|a, b| a.username.cmp(&b.username));
        members
    }
}
