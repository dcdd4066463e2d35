//! Wire protocol: JSON frames tagged by `event` with a `data` payload.
//!
//! Inbound frames decode into `ClientEvent` in one step; anything that does
//! not decode is answered with an `error` event to the origin only and
//! never mutates state. Outbound frames are `ServerEvent`.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::rooms::action::Action;
use crate::rooms::presence::RosterEntry;
use crate::rooms::ChatMessage;
use crate::state::AppState;
use crate::ws::relay::{self, SocketCtx};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
    pub username: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    pub room_id: String,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub room_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub room_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTogglePayload {
    pub room_id: String,
    pub user_id: String,
    pub username: String,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSharePayload {
    pub room_id: String,
    pub user_id: String,
    pub username: String,
}

/// Every event a connection may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom(JoinRoomPayload),
    Draw(ActionPayload),
    Erase(ActionPayload),
    Shape(ActionPayload),
    Brush(ActionPayload),
    ClearBoard(RoomPayload),
    SendMessage(SendMessagePayload),
    LeaveRoom(RoomPayload),
    VideoToggle(MediaTogglePayload),
    AudioToggle(MediaTogglePayload),
    ScreenShareStart(ScreenSharePayload),
    ScreenShareStop(ScreenSharePayload),
}

/// Every event the engine emits.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Ordered action replay sent to a joining connection (possibly empty).
    WhiteboardState(Vec<Action>),
    /// Bounded chat replay sent to a joining connection (possibly empty).
    ChatHistory(Vec<ChatMessage>),
    #[serde(rename_all = "camelCase")]
    UserJoined {
        user_id: String,
        username: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft {
        user_id: String,
        username: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    /// Full roster, broadcast to every member on any roster change.
    UsersUpdated { users: Vec<RosterEntry> },
    Draw(Action),
    Erase(Action),
    Shape(Action),
    Brush(Action),
    ClearBoard,
    ReceiveMessage(ChatMessage),
    #[serde(rename_all = "camelCase")]
    UserVideoToggle {
        user_id: String,
        username: String,
        enabled: bool,
    },
    #[serde(rename_all = "camelCase")]
    UserAudioToggle {
        user_id: String,
        username: String,
        enabled: bool,
    },
    #[serde(rename_all = "camelCase")]
    UserScreenShare {
        user_id: String,
        username: String,
        recording_id: String,
    },
    #[serde(rename_all = "camelCase")]
    UserStoppedSharing { user_id: String, username: String },
    /// Sent to the originating connection only; never broadcast.
    Error { message: String },
}

/// Handle an incoming text (JSON) frame: decode the event and dispatch.
pub async fn handle_text_message(
    text: &str,
    tx: &mpsc::UnboundedSender<Message>,
    state: &AppState,
    connection_id: &str,
    ctx: &mut SocketCtx,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                "Failed to decode client event"
            );
            send_error(tx, "Invalid message format");
            return;
        }
    };

    dispatch_event(event, tx, state, connection_id, ctx).await;
}

/// Dispatch a decoded event to the appropriate relay handler.
async fn dispatch_event(
    event: ClientEvent,
    tx: &mpsc::UnboundedSender<Message>,
    state: &AppState,
    connection_id: &str,
    ctx: &mut SocketCtx,
) {
    match event {
        ClientEvent::JoinRoom(payload) => {
            relay::handle_join_room(state, tx, connection_id, ctx, payload).await;
        }
        ClientEvent::Draw(payload) => {
            relay::handle_action(state, tx, connection_id, ActionEventKind::Draw, payload).await;
        }
        ClientEvent::Erase(payload) => {
            relay::handle_action(state, tx, connection_id, ActionEventKind::Erase, payload).await;
        }
        ClientEvent::Shape(payload) => {
            relay::handle_action(state, tx, connection_id, ActionEventKind::Shape, payload).await;
        }
        ClientEvent::Brush(payload) => {
            relay::handle_action(state, tx, connection_id, ActionEventKind::Brush, payload).await;
        }
        ClientEvent::ClearBoard(payload) => {
            relay::handle_clear_board(state, tx, connection_id, ctx, payload).await;
        }
        ClientEvent::SendMessage(payload) => {
            relay::handle_send_message(state, tx, ctx, payload).await;
        }
        ClientEvent::LeaveRoom(_) => {
            relay::handle_disconnect(state, connection_id, ctx).await;
        }
        ClientEvent::VideoToggle(payload) => {
            relay::handle_media_toggle(state, tx, connection_id, MediaKind::Video, payload).await;
        }
        ClientEvent::AudioToggle(payload) => {
            relay::handle_media_toggle(state, tx, connection_id, MediaKind::Audio, payload).await;
        }
        ClientEvent::ScreenShareStart(payload) => {
            relay::handle_screen_share_start(state, tx, connection_id, payload).await;
        }
        ClientEvent::ScreenShareStop(payload) => {
            relay::handle_screen_share_stop(state, tx, connection_id, payload).await;
        }
    }
}

/// Which of the four log-appending drawing events arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEventKind {
    Draw,
    Erase,
    Shape,
    Brush,
}

impl ActionEventKind {
    /// Wrap the received action in the matching broadcast event.
    pub fn broadcast(&self, action: Action) -> ServerEvent {
        match self {
            Self::Draw => ServerEvent::Draw(action),
            Self::Erase => ServerEvent::Erase(action),
            Self::Shape => ServerEvent::Shape(action),
            Self::Brush => ServerEvent::Brush(action),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Encode and send a server event on one connection's channel.
pub fn send_event(tx: &mpsc::UnboundedSender<Message>, event: &ServerEvent) {
    match serde_json::to_string(event) {
        Ok(text) => {
            let _ = tx.send(Message::Text(text.into()));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode server event");
        }
    }
}

/// Send an error event to the originating connection only.
pub fn send_error(tx: &mpsc::UnboundedSender<Message>, message: &str) {
    send_event(
        tx,
        &ServerEvent::Error {
            message: message.to_string(),
        },
    );
}
