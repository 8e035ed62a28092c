//! Presence tracker: who is logged in, independent of live sockets.
//!
//! A participant stays logged in across short reconnects; only an explicit
//! logout or an expired grace period removes them.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use examhub_core::types::{Identifier, ParticipantKind};

/// Tracks logged-in participants.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    logged_in: DashMap<Identifier, ParticipantKind>,
}

impl PresenceTracker {
    /// Create a new presence tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a login. Returns `true` only for the first login of this id.
    pub fn login(&self, id: &Identifier, kind: ParticipantKind) -> bool {
        match self.logged_in.entry(id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(kind);
                true
            }
        }
    }

    /// Remove a login, returning the kind it was recorded with.
    pub fn logout(&self, id: &Identifier) -> Option<ParticipantKind> {
        self.logged_in.remove(id).map(|(_, kind)| kind)
    }

    /// Check if a participant is logged in
    pub fn is_logged_in(&self, id: &Identifier) -> bool {
        self.logged_in.contains_key(id)
    }

    /// Number of logged-in participants.
    pub fn online_count(&self) -> usize {
        self.logged_in.len()
    }
}
