use std::sync::Arc;

use crate::audit::AuditSink;
use crate::db::DbPool;
use crate::rooms::registry::RoomRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// SQLite audit store wrapped in Arc<Mutex>
    pub db: DbPool,
    /// All room state; exclusive owner of rooms, rosters, logs, chat
    pub rooms: Arc<RoomRegistry>,
    /// Fire-and-forget audit record sink
    pub audit: AuditSink,
}
