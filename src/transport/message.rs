use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inbound chat frame. Any other fields a client sends are ignored; the
/// sender and room always come from the verified connection.
#[derive(Debug, Deserialize, Serialize)]
pub struct ClientMessage {
    pub content: String,
}

/// Body of `POST /websocket/createRoom`, also its response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoomRequest {
    pub id: String,
    pub name: String,
}

/// Plain acknowledgement body used by the session endpoints.
#[derive(Debug, Deserialize, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub message: String,
}

/// Turn one text frame into chat content.
///
/// - a JSON object must carry a string `content`;
/// - a JSON string literal is unquoted;
/// - anything else is taken verbatim.
///
/// Blank content yields `None`.
pub fn parse_inbound(text: &str) -> Option<String> {
    let content = match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => serde_json::from_value::<ClientMessage>(value)
            .ok()?
            .content,
        Ok(Value::String(content)) => content,
        _ => text.to_string(),
    };

    if content.trim().is_empty() {
        None
    } else {
        Some(content)
    }
}
