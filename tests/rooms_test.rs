//! Integration tests for the REST surface: room lifecycle, whiteboard
//! snapshot fetch/save, and the non-socket join path.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use slateboard_server::audit::AuditSink;
use slateboard_server::rooms::registry::RoomRegistry;
use slateboard_server::state::AppState;

/// Start the server on a random port with a throwaway data directory.
async fn start_test_server() -> (String, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    let db = slateboard_server::db::init_db(&data_dir).expect("Failed to init DB");
    let audit = AuditSink::spawn(db.clone());

    let state = AppState {
        db,
        rooms: Arc::new(RoomRegistry::new()),
        audit,
    };

    let app = slateboard_server::routes::build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (format!("http://{}", addr), tmp_dir)
}

#[tokio::test]
async fn create_then_get_room() {
    let (base_url, _tmp) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/rooms/create", base_url))
        .json(&json!({ "roomName": "Design Review" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["room"]["roomName"], "Design Review");
    let room_id = body["room"]["roomId"].as_str().unwrap().to_string();
    assert!(room_id.starts_with("room_"));

    let resp = client
        .get(format!("{}/api/rooms/{}", base_url, room_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["room"]["roomId"], room_id.as_str());
    assert_eq!(body["room"]["activeUsers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_room_defaults_name() {
    let (base_url, _tmp) = start_test_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/rooms/create", base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["room"]["roomName"], "Untitled Room");
}

#[tokio::test]
async fn get_room_rejects_bad_id_and_unknown_room() {
    let (base_url, _tmp) = start_test_server().await;
    let client = reqwest::Client::new();

    // Too short / bad characters: 400 before any lookup.
    let resp = client
        .get(format!("{}/api/rooms/ab", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Well-formed but nonexistent: 404.
    let resp = client
        .get(format!("{}/api/rooms/room_never_created", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn whiteboard_save_and_fetch() {
    let (base_url, _tmp) = start_test_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/api/rooms/create", base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = body["room"]["roomId"].as_str().unwrap().to_string();

    // Fresh room: empty action list.
    let body: Value = client
        .get(format!("{}/api/rooms/{}/whiteboard", base_url, room_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["actions"].as_array().unwrap().len(), 0);

    // Save a snapshot, then read it back.
    let resp = client
        .post(format!("{}/api/rooms/{}/whiteboard/save", base_url, room_id))
        .json(&json!({
            "actions": [
                { "kind": "draw", "x": 1, "y": 2, "color": "#ff0000", "strokeWidth": 3 },
                { "kind": "text", "x": 5, "y": 6, "text": "note", "fontSize": 12 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = client
        .get(format!("{}/api/rooms/{}/whiteboard", base_url, room_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let actions = body["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0]["kind"], "draw");
    assert_eq!(actions[1]["text"], "note");
}

#[tokio::test]
async fn whiteboard_save_rejects_invalid_actions() {
    let (base_url, _tmp) = start_test_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/api/rooms/create", base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = body["room"]["roomId"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{}/api/rooms/{}/whiteboard/save", base_url, room_id))
        .json(&json!({
            "actions": [ { "kind": "draw", "x": 1, "y": 2, "strokeWidth": 200 } ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // The rejected snapshot must not have replaced anything.
    let body: Value = client
        .get(format!("{}/api/rooms/{}/whiteboard", base_url, room_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["actions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn rest_join_allocates_user_id() {
    let (base_url, _tmp) = start_test_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/api/rooms/create", base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = body["room"]["roomId"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{}/api/users/join", base_url))
        .json(&json!({ "username": "alice", "roomId": room_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["user"]["userId"].as_str().unwrap().starts_with("user_"));
    assert_eq!(body["user"]["username"], "alice");

    // Invalid username.
    let resp = client
        .post(format!("{}/api/users/join", base_url))
        .json(&json!({ "username": "no@good", "roomId": room_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Unknown room.
    let resp = client
        .post(format!("{}/api/users/join", base_url))
        .json(&json!({ "username": "alice", "roomId": "room_never_created" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
