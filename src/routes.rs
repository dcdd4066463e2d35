use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::rooms::routes as room_routes;
use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Assemble the application router: REST surface, WebSocket upgrade, CORS.
pub fn build_router(state: AppState) -> Router {
    // The browser client is served from a different origin in development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/rooms/create", post(room_routes::create_room))
        .route("/api/rooms/{room_id}", get(room_routes::get_room))
        .route(
            "/api/rooms/{room_id}/whiteboard",
            get(room_routes::get_whiteboard),
        )
        .route(
            "/api/rooms/{room_id}/whiteboard/save",
            post(room_routes::save_whiteboard),
        )
        .route("/api/users/join", post(room_routes::rest_join))
        .route("/ws", get(ws_handler::ws_upgrade))
        .layer(cors)
        .with_state(state)
}
