//! Room registry: the one owner of all room state.
//!
//! `DashMap` keeps lookups for distinct rooms independent; each entry is an
//! `Arc<tokio::sync::Mutex<Room>>` so mutations of one room serialize while
//! other rooms proceed in parallel. Rooms with zero members persist — their
//! action log survives for later rejoining — until explicit deletion.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::ids;
use crate::rooms::Room;

pub type SharedRoom = Arc<Mutex<Room>>;

const DEFAULT_ROOM_NAME: &str = "Untitled Room";

/// Metadata returned from room creation.
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub room_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, SharedRoom>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room with a fresh unique id. Retries on the (practically
    /// unreachable) id collision rather than overwriting an existing room.
    pub fn create_room(&self, name: Option<String>) -> RoomSummary {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_ROOM_NAME.to_string());

        loop {
            let room_id = ids::room_id();
            match self.rooms.entry(room_id.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let room = Room::new(room_id.clone(), name.clone());
                    let created_at = room.created_at;
                    slot.insert(Arc::new(Mutex::new(room)));
                    tracing::info!(room_id = %room_id, name = %name, "Room created");
                    return RoomSummary {
                        room_id,
                        name,
                        created_at,
                    };
                }
            }
        }
    }

    /// Look up a room. Cloning the Arc keeps no lock on the map, so slow
    /// work inside one room never blocks lookups of others.
    pub fn get(&self, room_id: &str) -> Option<SharedRoom> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    /// Explicit deletion; not exercised by the synchronization core.
    pub fn remove(&self, room_id: &str) -> bool {
        self.rooms.remove(room_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
