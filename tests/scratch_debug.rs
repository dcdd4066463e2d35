//! Scratch reproduction of clear_then_own_draw_is_preserved with debug output.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use slateboard_server::audit::AuditSink;
use slateboard_server::rooms::registry::RoomRegistry;
use slateboard_server::state::AppState;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

async fn recv_event(ws: &mut WsClient) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Stream ended")
            .expect("WebSocket error");
        match msg {
            Message::Text(text) => return serde_json::from_str(&text).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected frame: {:?}", other),
        }
    }
}

#[tokio::test]
async fn scratch_clear_then_draw() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
    let tmp_dir = tempfile::tempdir().unwrap();
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();
    let db = slateboard_server::db::init_db(&data_dir).unwrap();
    let audit = AuditSink::spawn(db.clone());
    let state = AppState {
        db: db.clone(),
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

    let resp = reqwest::Client::new()
        .post(format!("http://{}/api/rooms/create", addr))
        .json(&json!({ "roomName": "Test Room" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let room_id = body["room"]["roomId"].as_str().unwrap().to_string();
    println!("room_id = {room_id}");

    let (mut alice, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    send_json(
        &mut alice,
        json!({ "event": "join-room", "data": { "roomId": room_id, "username": "alice", "userId": "user_alice" } }),
    )
    .await;
    for _ in 0..3 {
        let ev = recv_event(&mut alice).await;
        println!("alice got: {}", ev["event"]);
    }

    send_json(&mut alice, json!({ "event": "clear-board", "data": { "roomId": room_id } })).await;
    send_json(
        &mut alice,
        json!({ "event": "draw", "data": { "roomId": room_id, "action": {
            "kind": "draw", "prevX": 0, "prevY": 0, "x": 1.0, "y": 2.0,
            "color": "#000000", "strokeWidth": 2 } } }),
    )
    .await;

    let (mut bob, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    send_json(
        &mut bob,
        json!({ "event": "join-room", "data": { "roomId": room_id, "username": "bob", "userId": "user_bob" } }),
    )
    .await;
    let whiteboard = recv_event(&mut bob).await;
    println!("bob whiteboard-state: {}", whiteboard);
}
