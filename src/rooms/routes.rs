//! REST endpoints for room lifecycle and whiteboard snapshots.
//!
//! Thin wrappers over the registry: the socket relay remains the only
//! mutation path for live rooms apart from the snapshot save, which takes
//! the same per-room lock as socket appends.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;
use crate::rooms::action::Action;
use crate::state::AppState;
use crate::validate;

// --- Request / Response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub room_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub room_id: String,
    pub room_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CreateRoomResponse {
    pub success: bool,
    pub room: RoomInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub user_id: String,
    pub username: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetails {
    pub room_id: String,
    pub room_name: String,
    pub created_at: DateTime<Utc>,
    pub active_users: Vec<ActiveUser>,
}

#[derive(Debug, Serialize)]
pub struct GetRoomResponse {
    pub success: bool,
    pub room: RoomDetails,
}

#[derive(Debug, Serialize)]
pub struct WhiteboardResponse {
    pub success: bool,
    pub actions: Vec<Action>,
}

#[derive(Debug, Deserialize)]
pub struct SaveWhiteboardRequest {
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
}

#[derive(Debug, Serialize)]
pub struct SaveWhiteboardResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestJoinRequest {
    pub username: String,
    pub room_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestJoinUser {
    pub user_id: String,
    pub username: String,
    pub room_id: String,
}

#[derive(Debug, Serialize)]
pub struct RestJoinResponse {
    pub success: bool,
    pub user: RestJoinUser,
}

// --- Handlers ---

/// POST /api/rooms/create
pub async fn create_room(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomRequest>,
) -> (StatusCode, Json<CreateRoomResponse>) {
    let summary = state.rooms.create_room(body.room_name);
    (
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            success: true,
            room: RoomInfo {
                room_id: summary.room_id,
                room_name: summary.name,
                created_at: summary.created_at,
            },
        }),
    )
}

/// GET /api/rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<GetRoomResponse>, StatusCode> {
    if !validate::validate_room_id(&room_id) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let room = state.rooms.get(&room_id).ok_or(StatusCode::NOT_FOUND)?;
    let room = room.lock().await;

    Ok(Json(GetRoomResponse {
        success: true,
        room: RoomDetails {
            room_id: room.room_id.clone(),
            room_name: room.name.clone(),
            created_at: room.created_at,
            active_users: room
                .roster
                .members()
                .iter()
                .map(|m| ActiveUser {
                    user_id: m.user_id.clone(),
                    username: m.username.clone(),
                    joined_at: m.joined_at,
                })
                .collect(),
        },
    }))
}

/// GET /api/rooms/{room_id}/whiteboard
pub async fn get_whiteboard(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<WhiteboardResponse>, StatusCode> {
    if !validate::validate_room_id(&room_id) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let actions = match state.rooms.get(&room_id) {
        Some(room) => room.lock().await.log.snapshot(),
        // Unknown room replays as empty rather than 404 — a client may
        // fetch before the first action ever lands.
        None => Vec::new(),
    };

    Ok(Json(WhiteboardResponse {
        success: true,
        actions,
    }))
}

/// POST /api/rooms/{room_id}/whiteboard/save
/// Replaces the room's action snapshot wholesale. Every action is
/// validated; the swap happens under the room lock so a concurrent joiner
/// never replays a torn snapshot.
pub async fn save_whiteboard(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(body): Json<SaveWhiteboardRequest>,
) -> Result<Json<SaveWhiteboardResponse>, StatusCode> {
    if !validate::validate_room_id(&room_id) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let room = state.rooms.get(&room_id).ok_or(StatusCode::NOT_FOUND)?;

    if let Some(actions) = body.actions {
        if !actions.iter().all(validate::validate_action) {
            return Err(StatusCode::BAD_REQUEST);
        }
        let mut room = room.lock().await;
        room.log.replace(actions);
        room.touch();
    }

    Ok(Json(SaveWhiteboardResponse {
        success: true,
        message: "Whiteboard data saved successfully".to_string(),
    }))
}

/// POST /api/users/join
/// Mirrors join-room validation for non-socket clients and allocates a
/// userId; live membership still begins with the socket join.
pub async fn rest_join(
    State(state): State<AppState>,
    Json(body): Json<RestJoinRequest>,
) -> Result<Json<RestJoinResponse>, StatusCode> {
    if !validate::validate_username(&body.username) || !validate::validate_room_id(&body.room_id)
    {
        return Err(StatusCode::BAD_REQUEST);
    }

    if state.rooms.get(&body.room_id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }

    let user_id = ids::user_id();
    tracing::info!(
        room_id = %body.room_id,
        user_id = %user_id,
        username = %body.username,
        "User id allocated via REST join"
    );

    Ok(Json(RestJoinResponse {
        success: true,
        user: RestJoinUser {
            user_id,
            username: body.username.trim().to_string(),
            room_id: body.room_id,
        },
    }))
}
