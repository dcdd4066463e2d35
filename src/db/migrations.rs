use rusqlite_migration::{Migrations, M};

/// Define all schema migrations.
/// Uses SQLite user_version pragma for tracking — no migration table needed.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "-- Migration 1: audit store

CREATE TABLE logins (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    username TEXT NOT NULL,
    room_id TEXT NOT NULL,
    login_time TEXT NOT NULL,
    logout_time TEXT,
    session_duration INTEGER,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX idx_logins_user_room ON logins(user_id, room_id, is_active);

CREATE TABLE activity_log (
    log_id TEXT PRIMARY KEY,
    room_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    username TEXT NOT NULL,
    activity_type TEXT NOT NULL,
    description TEXT NOT NULL,
    metadata TEXT,
    timestamp TEXT NOT NULL
);

CREATE INDEX idx_activity_room_time ON activity_log(room_id, timestamp);
CREATE INDEX idx_activity_user_time ON activity_log(user_id, timestamp);
CREATE INDEX idx_activity_type_time ON activity_log(activity_type, timestamp);

CREATE TABLE session_recordings (
    recording_id TEXT PRIMARY KEY,
    room_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    username TEXT NOT NULL,
    recording_type TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    duration INTEGER,
    status TEXT NOT NULL
);

CREATE INDEX idx_recordings_active ON session_recordings(room_id, user_id, status);

CREATE TABLE chat_messages (
    message_id TEXT PRIMARY KEY,
    room_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    username TEXT NOT NULL,
    message TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX idx_chat_room_time ON chat_messages(room_id, timestamp);
",
    )])
}
