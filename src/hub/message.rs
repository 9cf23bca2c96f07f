//! Message definitions for the hub
//!
//! `Message` is both the internal and the outbound wire representation. It is
//! built once, wrapped in an `Arc`, and shared read-only by every recipient
//! queue it is pushed onto.
//!
//! Wire shape: `{"content": "...", "roomID": "...", "username": "...", "kind": "chat"}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Chat,
    Join,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    #[serde(rename = "roomID")]
    pub room_id: String,
    pub username: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn chat(room_id: &str, username: &str, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            room_id: room_id.to_string(),
            username: username.to_string(),
            kind: MessageKind::Chat,
        }
    }

    /// Announcement synthesized by the hub when `username` enters the room.
    pub fn join(room_id: &str, username: &str) -> Self {
        Self {
            content: format!("{username} has joined the room"),
            room_id: room_id.to_string(),
            username: username.to_string(),
            kind: MessageKind::Join,
        }
    }

    /// Announcement synthesized by the hub when `username` leaves or is evicted.
    pub fn leave(room_id: &str, username: &str) -> Self {
        Self {
            content: format!("{username} has left the room"),
            room_id: room_id.to_string(),
            username: username.to_string(),
            kind: MessageKind::Leave,
        }
    }
}
