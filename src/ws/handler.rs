use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
};

use crate::ids;
use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
/// WebSocket upgrade endpoint. Connections carry no identity at upgrade
/// time; the first join-room event binds (roomId, userId, username) to the
/// connection. On success, spawns an actor for the connection.
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let connection_id = ids::connection_id();
    tracing::info!(connection_id = %connection_id, "WebSocket connection accepted");
    ws.on_upgrade(move |socket| handle_connected(socket, state, connection_id))
}

async fn handle_connected(socket: WebSocket, state: AppState, connection_id: String) {
    actor::run_connection(socket, state, connection_id).await;
}
