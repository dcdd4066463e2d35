//! Room state: membership, action log, and chat history.
//!
//! A room is one unit of mutual exclusion. The registry hands out
//! `Arc<Mutex<Room>>` entries; every mutation of a room — join, leave,
//! append, clear, chat — happens under that room's lock, so events within
//! a room apply in one total order while distinct rooms never contend.

pub mod action;
pub mod log;
pub mod presence;
pub mod registry;
pub mod routes;

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rooms::action::Action;
use crate::rooms::log::ActionLog;
use crate::rooms::presence::{Member, Roster, RosterEntry};

/// Most recent chat messages kept per room for replay to new joiners.
pub const CHAT_HISTORY_LIMIT: usize = 50;

/// A chat message with server-assigned id, identity, and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message_id: String,
    pub user_id: String,
    pub username: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Replay bundle returned to a joining connection.
#[derive(Debug)]
pub struct JoinReplay {
    pub actions: Vec<Action>,
    pub chat_history: Vec<ChatMessage>,
    pub roster: Vec<RosterEntry>,
    /// False when the userId was already a member (rebinding join).
    pub newly_added: bool,
}

#[derive(Debug)]
pub struct Room {
    pub room_id: String,
    pub name: String,
    pub roster: Roster,
    pub log: ActionLog,
    chat: VecDeque<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Room {
    pub fn new(room_id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            room_id,
            name,
            roster: Roster::new(),
            log: ActionLog::new(),
            chat: VecDeque::new(),
            created_at: now,
            last_modified: now,
        }
    }

    /// Add a member (idempotent per userId) and return the replay bundle:
    /// current action log, bounded chat history, and the updated roster.
    pub fn join(&mut self, member: Member) -> JoinReplay {
        let newly_added = self.roster.join(member);
        JoinReplay {
            actions: self.log.snapshot(),
            chat_history: self.chat_history(),
            roster: self.roster.snapshot(),
            newly_added,
        }
    }

    /// Append a chat message, evicting the oldest beyond the history bound.
    pub fn push_chat(&mut self, message: ChatMessage) {
        self.chat.push_back(message);
        while self.chat.len() > CHAT_HISTORY_LIMIT {
            self.chat.pop_front();
        }
    }

    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.chat.iter().cloned().collect()
    }

    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(n: usize) -> ChatMessage {
        ChatMessage {
            message_id: format!("msg_{n}"),
            user_id: "user_1".to_string(),
            username: "alice".to_string(),
            message: format!("hello {n}"),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn chat_history_is_bounded_to_most_recent() {
        let mut room = Room::new("room_test_1".to_string(), "Test".to_string());
        for n in 0..CHAT_HISTORY_LIMIT + 10 {
            room.push_chat(message(n));
        }
        let history = room.chat_history();
        assert_eq!(history.len(), CHAT_HISTORY_LIMIT);
        assert_eq!(history[0].message_id, "msg_10");
        assert_eq!(
            history.last().unwrap().message_id,
            format!("msg_{}", CHAT_HISTORY_LIMIT + 9)
        );
    }

    #[test]
    fn join_returns_current_state() {
        let mut room = Room::new("room_test_2".to_string(), "Test".to_string());
        room.push_chat(message(1));
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let replay = room.join(Member {
            user_id: "user_1".to_string(),
            username: "alice".to_string(),
            joined_at: Utc::now(),
            connection_id: "conn_1".to_string(),
            sender: tx,
        });
        assert!(replay.newly_added);
        assert!(replay.actions.is_empty());
        assert_eq!(replay.chat_history.len(), 1);
        assert_eq!(replay.roster.len(), 1);
    }
}
