//! Append-only action log for one room.
//!
//! The log itself is a plain sequence; atomicity of append/clear/snapshot
//! against concurrent connections comes from the owning room's mutex, which
//! is held across every mutation of that room.

use crate::rooms::action::Action;

#[derive(Debug, Default)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already-validated action. Appends are never reordered:
    /// the caller serializes them per room.
    pub fn append(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Replace the log with an empty sequence. The one destructive
    /// operation; an append applied after this lands in the fresh log.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Replace the whole log (REST snapshot save path).
    pub fn replace(&mut self, actions: Vec<Action>) {
        self.actions = actions;
    }

    /// Ordered copy of the log for replay to a joining client.
    pub fn snapshot(&self) -> Vec<Action> {
        self.actions.clone()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
