//! Fire-and-forget audit sink.
//!
//! The relay calls `record` after broadcasting; records travel over an
//! unbounded channel to a writer task that persists them with rusqlite via
//! `spawn_blocking`. A failed write is logged and counted, never retried
//! and never surfaced to a client — the in-memory broadcast has already
//! happened and is authoritative for live members. Known caveat: a crash
//! between broadcast and write loses the record.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::db::DbPool;
use crate::rooms::ChatMessage;

/// Activity taxonomy for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    JoinRoom,
    LeaveRoom,
    ClearBoard,
    EnableVideo,
    DisableVideo,
    EnableAudio,
    DisableAudio,
    ScreenShare,
    CreateRoom,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JoinRoom => "join_room",
            Self::LeaveRoom => "leave_room",
            Self::ClearBoard => "clear_board",
            Self::EnableVideo => "enable_video",
            Self::DisableVideo => "disable_video",
            Self::EnableAudio => "enable_audio",
            Self::DisableAudio => "disable_audio",
            Self::ScreenShare => "screen_share",
            Self::CreateRoom => "create_room",
        }
    }
}

/// One durable audit record.
#[derive(Debug)]
pub enum AuditRecord {
    /// Session opened: a user joined a room over a live connection.
    Login {
        login_id: String,
        user_id: String,
        username: String,
        room_id: String,
        login_time: DateTime<Utc>,
    },
    /// Session closed: leave or disconnect. Closes the most recent active
    /// login row and stamps the session duration.
    Logout {
        user_id: String,
        room_id: String,
        logout_time: DateTime<Utc>,
    },
    Activity {
        log_id: String,
        room_id: String,
        user_id: String,
        username: String,
        activity_type: ActivityType,
        description: String,
        metadata: Option<serde_json::Value>,
        timestamp: DateTime<Utc>,
    },
    RecordingStarted {
        recording_id: String,
        room_id: String,
        user_id: String,
        username: String,
        recording_type: String,
        start_time: DateTime<Utc>,
    },
    /// Closes every active recording for (room, user) with the end time
    /// and a duration in whole seconds.
    RecordingStopped {
        room_id: String,
        user_id: String,
        end_time: DateTime<Utc>,
    },
    Chat {
        room_id: String,
        message: ChatMessage,
    },
}

/// Handle for submitting audit records. Cheap to clone; dropping every
/// clone stops the writer task once the queue drains.
#[derive(Clone)]
pub struct AuditSink {
    tx: mpsc::UnboundedSender<AuditRecord>,
    failures: Arc<AtomicU64>,
}

impl AuditSink {
    /// Spawn the writer task and return the sink handle.
    pub fn spawn(db: DbPool) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let failures = Arc::new(AtomicU64::new(0));
        tokio::spawn(writer_loop(db, rx, failures.clone()));
        Self { tx, failures }
    }

    /// Submit a record. Never blocks, never fails from the caller's view.
    pub fn record(&self, record: AuditRecord) {
        if self.tx.send(record).is_err() {
            tracing::warn!("Audit writer task is gone; record dropped");
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of records that failed to persist since startup.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

async fn writer_loop(
    db: DbPool,
    mut rx: mpsc::UnboundedReceiver<AuditRecord>,
    failures: Arc<AtomicU64>,
) {
    while let Some(record) = rx.recv().await {
        let db = db.clone();
        let result = tokio::task::spawn_blocking(move || write_record(&db, record)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "Audit record write failed");
            }
            Err(e) => {
                failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "Audit writer task panicked");
            }
        }
    }
}

fn write_record(db: &DbPool, record: AuditRecord) -> Result<(), String> {
    let conn = db.lock().map_err(|_| "DB lock poisoned".to_string())?;
    let result = match record {
        AuditRecord::Login {
            login_id,
            user_id,
            username,
            room_id,
            login_time,
        } => conn.execute(
            "INSERT INTO logins (id, user_id, username, room_id, login_time, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            rusqlite::params![login_id, user_id, username, room_id, login_time.to_rfc3339()],
        ),
        AuditRecord::Logout {
            user_id,
            room_id,
            logout_time,
        } => conn.execute(
            "UPDATE logins SET
                 logout_time = ?1,
                 is_active = 0,
                 session_duration = CAST((julianday(?1) - julianday(login_time)) * 86400 AS INTEGER)
             WHERE id = (
                 SELECT id FROM logins
                 WHERE user_id = ?2 AND room_id = ?3 AND is_active = 1
                 ORDER BY login_time DESC LIMIT 1
             )",
            rusqlite::params![logout_time.to_rfc3339(), user_id, room_id],
        ),
        AuditRecord::Activity {
            log_id,
            room_id,
            user_id,
            username,
            activity_type,
            description,
            metadata,
            timestamp,
        } => conn.execute(
            "INSERT INTO activity_log
                 (log_id, room_id, user_id, username, activity_type, description, metadata, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                log_id,
                room_id,
                user_id,
                username,
                activity_type.as_str(),
                description,
                metadata.map(|m| m.to_string()),
                timestamp.to_rfc3339()
            ],
        ),
        AuditRecord::RecordingStarted {
            recording_id,
            room_id,
            user_id,
            username,
            recording_type,
            start_time,
        } => conn.execute(
            "INSERT INTO session_recordings
                 (recording_id, room_id, user_id, username, recording_type, start_time, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'recording')",
            rusqlite::params![
                recording_id,
                room_id,
                user_id,
                username,
                recording_type,
                start_time.to_rfc3339()
            ],
        ),
        AuditRecord::RecordingStopped {
            room_id,
            user_id,
            end_time,
        } => conn.execute(
            "UPDATE session_recordings SET
                 end_time = ?1,
                 status = 'completed',
                 duration = CAST((julianday(?1) - julianday(start_time)) * 86400 AS INTEGER)
             WHERE room_id = ?2 AND user_id = ?3 AND status = 'recording'",
            rusqlite::params![end_time.to_rfc3339(), room_id, user_id],
        ),
        AuditRecord::Chat { room_id, message } => conn.execute(
            "INSERT INTO chat_messages (message_id, room_id, user_id, username, message, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                message.message_id,
                room_id,
                message.user_id,
                message.username,
                message.message,
                message.timestamp.to_rfc3339()
            ],
        ),
    };

    result.map(|_| ()).map_err(|e| e.to_string())
}

/// Count activity rows of one type in a room. Test/inspection helper.
pub fn activity_count(db: &DbPool, room_id: &str, activity_type: ActivityType) -> Result<i64, String> {
    let conn = db.lock().map_err(|_| "DB lock poisoned".to_string())?;
    conn.query_row(
        "SELECT COUNT(*) FROM activity_log WHERE room_id = ?1 AND activity_type = ?2",
        rusqlite::params![room_id, activity_type.as_str()],
        |row| row.get(0),
    )
    .map_err(|e| e.to_string())
}

/// Count open login sessions for a room. Test/inspection helper.
pub fn active_login_count(db: &DbPool, room_id: &str) -> Result<i64, String> {
    let conn = db.lock().map_err(|_| "DB lock poisoned".to_string())?;
    conn.query_row(
        "SELECT COUNT(*) FROM logins WHERE room_id = ?1 AND is_active = 1",
        rusqlite::params![room_id],
        |row| row.get(0),
    )
    .map_err(|e| e.to_string())
}
