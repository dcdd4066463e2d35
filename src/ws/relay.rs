//! Event relay: validates inbound events, applies them to room state, and
//! broadcasts to sibling connections.
//!
//! Each handler follows one shape: validate (a rejected event answers the
//! origin only and mutates nothing), lock the target room, apply the
//! mutation and broadcast under the lock, then hand the audit record to the
//! fire-and-forget sink. Because the lock covers apply+broadcast, all
//! members of a room observe the same total order; distinct rooms never
//! share a lock, so they proceed in parallel.

use axum::extract::ws::Message;
use chrono::Utc;
use tokio::sync::mpsc;

use crate::audit::{ActivityType, AuditRecord};
use crate::ids;
use crate::rooms::presence::Member;
use crate::rooms::ChatMessage;
use crate::state::AppState;
use crate::validate;
use crate::ws::broadcast::{broadcast_to_all, broadcast_to_others};
use crate::ws::protocol::{
    send_error, send_event, ActionEventKind, ActionPayload, JoinRoomPayload, MediaKind,
    MediaTogglePayload, RoomPayload, ScreenSharePayload, SendMessagePayload, ServerEvent,
};

/// Identity bound to a connection by its join-room event.
#[derive(Debug, Clone)]
pub struct BoundIdentity {
    pub room_id: String,
    pub user_id: String,
    pub username: String,
}

/// Per-connection mutable context, owned by the connection's reader loop.
/// Connections hold only this weak back-reference to room state; all
/// mutation goes through the relay's serialized path.
#[derive(Debug, Default)]
pub struct SocketCtx {
    pub identity: Option<BoundIdentity>,
}

/// join-room: bind identity, add to roster, replay state to the joiner,
/// announce to the rest of the room.
pub async fn handle_join_room(
    state: &AppState,
    tx: &mpsc::UnboundedSender<Message>,
    connection_id: &str,
    ctx: &mut SocketCtx,
    payload: JoinRoomPayload,
) {
    if !validate::validate_room_id(&payload.room_id)
        || !validate::validate_username(&payload.username)
        || payload.user_id.is_empty()
    {
        send_error(tx, "Invalid room or user data");
        return;
    }

    let Some(room) = state.rooms.get(&payload.room_id) else {
        send_error(tx, "Room not found");
        return;
    };

    // A connection holds one membership. Joining a different room, or the
    // same room under a different userId, leaves the current membership
    // first with the usual roster broadcast; otherwise the old entry would
    // linger in the roster with no disconnect ever matching it.
    let rebinding = ctx
        .identity
        .as_ref()
        .is_some_and(|bound| bound.room_id != payload.room_id || bound.user_id != payload.user_id);
    if rebinding {
        handle_disconnect(state, connection_id, ctx).await;
    }

    let username = payload.username.trim().to_string();
    let joined_at = Utc::now();

    {
        let mut room = room.lock().await;
        let replay = room.join(Member {
            user_id: payload.user_id.clone(),
            username: username.clone(),
            joined_at,
            connection_id: connection_id.to_string(),
            sender: tx.clone(),
        });

        // Replay to the joiner, then announce. Both happen under the room
        // lock so no other event interleaves between roster change and
        // roster broadcast.
        send_event(tx, &ServerEvent::WhiteboardState(replay.actions));
        send_event(tx, &ServerEvent::ChatHistory(replay.chat_history));
        broadcast_to_others(
            &room,
            &ServerEvent::UserJoined {
                user_id: payload.user_id.clone(),
                username: username.clone(),
                timestamp: joined_at,
            },
            connection_id,
        );
        broadcast_to_all(
            &room,
            &ServerEvent::UsersUpdated {
                users: replay.roster,
            },
        );
        room.touch();
    }

    ctx.identity = Some(BoundIdentity {
        room_id: payload.room_id.clone(),
        user_id: payload.user_id.clone(),
        username: username.clone(),
    });

    state.audit.record(AuditRecord::Login {
        login_id: ids::login_id(),
        user_id: payload.user_id.clone(),
        username: username.clone(),
        room_id: payload.room_id.clone(),
        login_time: joined_at,
    });
    state.audit.record(AuditRecord::Activity {
        log_id: ids::log_id(),
        room_id: payload.room_id.clone(),
        user_id: payload.user_id.clone(),
        username: username.clone(),
        activity_type: ActivityType::JoinRoom,
        description: format!("{} joined room {}", username, payload.room_id),
        metadata: None,
        timestamp: joined_at,
    });

    tracing::info!(
        room_id = %payload.room_id,
        user_id = %payload.user_id,
        username = %username,
        "User joined room"
    );
}

/// draw / erase / shape / brush: append to the action log and broadcast
/// the received action to the rest of the room.
pub async fn handle_action(
    state: &AppState,
    tx: &mpsc::UnboundedSender<Message>,
    connection_id: &str,
    kind: ActionEventKind,
    payload: ActionPayload,
) {
    if !validate::validate_room_id(&payload.room_id)
        || !validate::validate_action(&payload.action)
    {
        send_error(tx, "Invalid drawing data");
        return;
    }

    let Some(room) = state.rooms.get(&payload.room_id) else {
        send_error(tx, "Room not found");
        return;
    };

    let mut room = room.lock().await;
    room.log.append(payload.action.clone());
    room.touch();
    broadcast_to_others(&room, &kind.broadcast(payload.action), connection_id);
}

/// clear-board: atomically reset the log and tell everyone else.
pub async fn handle_clear_board(
    state: &AppState,
    tx: &mpsc::UnboundedSender<Message>,
    connection_id: &str,
    ctx: &SocketCtx,
    payload: RoomPayload,
) {
    if !validate::validate_room_id(&payload.room_id) {
        send_error(tx, "Invalid room ID");
        return;
    }

    let Some(room) = state.rooms.get(&payload.room_id) else {
        send_error(tx, "Room not found");
        return;
    };

    {
        let mut room = room.lock().await;
        room.log.clear();
        room.touch();
        broadcast_to_others(&room, &ServerEvent::ClearBoard, connection_id);
    }

    if let Some(bound) = &ctx.identity {
        state.audit.record(AuditRecord::Activity {
            log_id: ids::log_id(),
            room_id: payload.room_id.clone(),
            user_id: bound.user_id.clone(),
            username: bound.username.clone(),
            activity_type: ActivityType::ClearBoard,
            description: format!("{} cleared the board", bound.username),
            metadata: None,
            timestamp: Utc::now(),
        });
    }
}

/// send-message: identity comes from the connection's binding, never from
/// the payload; delivered to all members including the sender.
pub async fn handle_send_message(
    state: &AppState,
    tx: &mpsc::UnboundedSender<Message>,
    ctx: &SocketCtx,
    payload: SendMessagePayload,
) {
    let Some(bound) = &ctx.identity else {
        send_error(tx, "Invalid message data");
        return;
    };

    let text = payload.message.trim().to_string();
    if text.is_empty() {
        send_error(tx, "Invalid message data");
        return;
    }

    if !validate::validate_room_id(&payload.room_id) {
        send_error(tx, "Invalid room ID");
        return;
    }

    let Some(room) = state.rooms.get(&payload.room_id) else {
        send_error(tx, "Room not found");
        return;
    };

    let message = ChatMessage {
        message_id: ids::message_id(),
        user_id: bound.user_id.clone(),
        username: bound.username.clone(),
        message: text,
        timestamp: Utc::now(),
    };

    {
        let mut room = room.lock().await;
        room.push_chat(message.clone());
        broadcast_to_all(&room, &ServerEvent::ReceiveMessage(message.clone()));
    }

    state.audit.record(AuditRecord::Chat {
        room_id: payload.room_id,
        message,
    });
}

/// video-toggle / audio-toggle: presence-only pass-through. No log effect.
pub async fn handle_media_toggle(
    state: &AppState,
    tx: &mpsc::UnboundedSender<Message>,
    connection_id: &str,
    kind: MediaKind,
    payload: MediaTogglePayload,
) {
    if !validate::validate_room_id(&payload.room_id) {
        send_error(tx, "Invalid room ID");
        return;
    }

    let Some(room) = state.rooms.get(&payload.room_id) else {
        send_error(tx, "Room not found");
        return;
    };

    let event = match kind {
        MediaKind::Video => ServerEvent::UserVideoToggle {
            user_id: payload.user_id.clone(),
            username: payload.username.clone(),
            enabled: payload.enabled,
        },
        MediaKind::Audio => ServerEvent::UserAudioToggle {
            user_id: payload.user_id.clone(),
            username: payload.username.clone(),
            enabled: payload.enabled,
        },
    };

    {
        let room = room.lock().await;
        broadcast_to_others(&room, &event, connection_id);
    }

    let (activity_type, verb, medium) = match (kind, payload.enabled) {
        (MediaKind::Video, true) => (ActivityType::EnableVideo, "enabled", "video"),
        (MediaKind::Video, false) => (ActivityType::DisableVideo, "disabled", "video"),
        (MediaKind::Audio, true) => (ActivityType::EnableAudio, "enabled", "audio"),
        (MediaKind::Audio, false) => (ActivityType::DisableAudio, "disabled", "audio"),
    };
    state.audit.record(AuditRecord::Activity {
        log_id: ids::log_id(),
        room_id: payload.room_id,
        user_id: payload.user_id,
        username: payload.username.clone(),
        activity_type,
        description: format!("{} {} {}", payload.username, verb, medium),
        metadata: None,
        timestamp: Utc::now(),
    });
}

/// screen-share-start: open a recording session and announce it.
pub async fn handle_screen_share_start(
    state: &AppState,
    tx: &mpsc::UnboundedSender<Message>,
    connection_id: &str,
    payload: ScreenSharePayload,
) {
    if !validate::validate_room_id(&payload.room_id) {
        send_error(tx, "Invalid room ID");
        return;
    }

    let Some(room) = state.rooms.get(&payload.room_id) else {
        send_error(tx, "Room not found");
        return;
    };

    let recording_id = ids::recording_id();
    let start_time = Utc::now();

    {
        let room = room.lock().await;
        broadcast_to_others(
            &room,
            &ServerEvent::UserScreenShare {
                user_id: payload.user_id.clone(),
                username: payload.username.clone(),
                recording_id: recording_id.clone(),
            },
            connection_id,
        );
    }

    state.audit.record(AuditRecord::RecordingStarted {
        recording_id: recording_id.clone(),
        room_id: payload.room_id.clone(),
        user_id: payload.user_id.clone(),
        username: payload.username.clone(),
        recording_type: "screen".to_string(),
        start_time,
    });
    state.audit.record(AuditRecord::Activity {
        log_id: ids::log_id(),
        room_id: payload.room_id,
        user_id: payload.user_id,
        username: payload.username.clone(),
        activity_type: ActivityType::ScreenShare,
        description: format!("{} started screen sharing", payload.username),
        metadata: Some(serde_json::json!({ "recordingId": recording_id })),
        timestamp: start_time,
    });
}

/// screen-share-stop: close the recording session and announce it.
pub async fn handle_screen_share_stop(
    state: &AppState,
    tx: &mpsc::UnboundedSender<Message>,
    connection_id: &str,
    payload: ScreenSharePayload,
) {
    if !validate::validate_room_id(&payload.room_id) {
        send_error(tx, "Invalid room ID");
        return;
    }

    let Some(room) = state.rooms.get(&payload.room_id) else {
        send_error(tx, "Room not found");
        return;
    };

    {
        let room = room.lock().await;
        broadcast_to_others(
            &room,
            &ServerEvent::UserStoppedSharing {
                user_id: payload.user_id.clone(),
                username: payload.username.clone(),
            },
            connection_id,
        );
    }

    let end_time = Utc::now();
    state.audit.record(AuditRecord::RecordingStopped {
        room_id: payload.room_id.clone(),
        user_id: payload.user_id.clone(),
        end_time,
    });
    state.audit.record(AuditRecord::Activity {
        log_id: ids::log_id(),
        room_id: payload.room_id,
        user_id: payload.user_id,
        username: payload.username.clone(),
        activity_type: ActivityType::ScreenShare,
        description: format!("{} stopped screen sharing", payload.username),
        metadata: None,
        timestamp: end_time,
    });
}

/// Explicit leave and implicit disconnect share this path: remove the
/// membership, broadcast the updated roster, close the audit session.
pub async fn handle_disconnect(state: &AppState, connection_id: &str, ctx: &mut SocketCtx) {
    let Some(bound) = ctx.identity.take() else {
        return;
    };

    let left_at = Utc::now();
    let mut removed = false;

    if let Some(room) = state.rooms.get(&bound.room_id) {
        let mut room = room.lock().await;
        // Only this connection's own binding may be removed; a rejoined
        // user on a newer connection stays in the roster.
        removed = room.roster.leave_connection(&bound.user_id, connection_id);
        if removed {
            broadcast_to_others(
                &room,
                &ServerEvent::UserLeft {
                    user_id: bound.user_id.clone(),
                    username: bound.username.clone(),
                    timestamp: left_at,
                },
                connection_id,
            );
            broadcast_to_all(
                &room,
                &ServerEvent::UsersUpdated {
                    users: room.roster.snapshot(),
                },
            );
        }
    }

    if removed {
        state.audit.record(AuditRecord::Logout {
            user_id: bound.user_id.clone(),
            room_id: bound.room_id.clone(),
            logout_time: left_at,
        });
        state.audit.record(AuditRecord::RecordingStopped {
            room_id: bound.room_id.clone(),
            user_id: bound.user_id.clone(),
            end_time: left_at,
        });
        state.audit.record(AuditRecord::Activity {
            log_id: ids::log_id(),
            room_id: bound.room_id.clone(),
            user_id: bound.user_id.clone(),
            username: bound.username.clone(),
            activity_type: ActivityType::LeaveRoom,
            description: format!("{} left room {}", bound.username, bound.room_id),
            metadata: None,
            timestamp: left_at,
        });

        tracing::info!(
            room_id = %bound.room_id,
            user_id = %bound.user_id,
            username = %bound.username,
            "User left room"
        );
    }
}
