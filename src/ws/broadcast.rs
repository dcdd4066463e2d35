//! Broadcast helpers for room-scoped server events.
//!
//! Callers hold the room's lock while broadcasting, so every member
//! observes events for that room in the same total order. Sends are
//! unbounded-channel pushes and never block.

use axum::extract::ws::Message;

use crate::rooms::Room;
use crate::ws::protocol::ServerEvent;

/// Broadcast an event to every member of the room, optionally excluding
/// one connection (the originator).
pub fn broadcast_to_room(room: &Room, event: &ServerEvent, exclude_connection: Option<&str>) {
    let text = match serde_json::to_string(event) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode broadcast event");
            return;
        }
    };
    let msg = Message::Text(text.into());

    for member in room.roster.members() {
        if exclude_connection == Some(member.connection_id.as_str()) {
            continue;
        }
        // A closed sender means the member's actor is shutting down; its
        // own disconnect path removes it from the roster.
        let _ = member.sender.send(msg.clone());
    }
}

/// Broadcast to every member except the originating connection.
pub fn broadcast_to_others(room: &Room, event: &ServerEvent, origin_connection: &str) {
    broadcast_to_room(room, event, Some(origin_connection));
}

/// Broadcast to every member including the originating connection.
pub fn broadcast_to_all(room: &Room, event: &ServerEvent) {
    broadcast_to_room(room, event, None);
}
