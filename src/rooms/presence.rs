//! Active-user roster for one room.
//!
//! Joins are idempotent per userId: a second join with the same userId
//! replaces the existing entry, rebinding the connection handle. Leaving
//! when absent is a no-op. Disconnect and explicit leave are equivalent.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ws::ConnectionSender;

/// Live participation of one user in one room, bound to the originating
/// WebSocket connection.
#[derive(Debug, Clone)]
pub struct Member {
    pub user_id: String,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    pub connection_id: String,
    pub sender: ConnectionSender,
}

/// Wire shape for the `users-updated` roster broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Default)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, replacing any existing entry with the same userId
    /// (auto-rejoin / connection rebinding). Returns true if the user was
    /// not previously present.
    pub fn join(&mut self, member: Member) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.user_id != member.user_id);
        let newly_added = self.members.len() == before;
        self.members.push(member);
        newly_added
    }

    /// Remove the member with the given userId, but only while it is still
    /// bound to `connection_id` — a stale connection's disconnect must not
    /// evict a fresh rebinding. Returns true if an entry was removed.
    pub fn leave_connection(&mut self, user_id: &str, connection_id: &str) -> bool {
        let before = self.members.len();
        self.members
            .retain(|m| !(m.user_id == user_id && m.connection_id == connection_id));
        self.members.len() < before
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Full roster snapshot, broadcast to all members on every change.
    pub fn snapshot(&self) -> Vec<RosterEntry> {
        self.members
            .iter()
            .map(|m| RosterEntry {
                user_id: m.user_id.clone(),
                username: m.username.clone(),
            })
            .collect()
    }
}
