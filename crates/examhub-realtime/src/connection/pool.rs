//! Connection pool with one live connection per participant id.

use std::sync::Arc;

use dashmap::DashMap;

use examhub_core::types::{ConnectionId, Identifier};

use super::handle::ConnectionHandle;

/// Thread-safe pool of registered connections, keyed by participant id.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_participant: DashMap<Identifier, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection, returning the one it replaced.
    pub fn insert(&self, handle: Arc<ConnectionHandle>) -> Option<Arc<ConnectionHandle>> {
        self.by_participant
            .insert(handle.participant.id.clone(), handle)
    }

    /// Removes the participant's connection only if it is `conn_id`.
    ///
    /// A socket closing after its participant reconnected elsewhere must not
    /// evict the newer connection.
    pub fn remove_if_current(
        &self,
        participant_id: &Identifier,
        conn_id: ConnectionId,
    ) -> Option<Arc<ConnectionHandle>> {
        self.by_participant
            .remove_if(participant_id, |_, handle| handle.id == conn_id)
            .map(|(_, handle)| handle)
    }

    /// Removes the participant's connection unconditionally.
    pub fn remove(&self, participant_id: &Identifier) -> Option<Arc<ConnectionHandle>> {
        self.by_participant
            .remove(participant_id)
            .map(|(_, handle)| handle)
    }

    /// Gets the participant's connection.
    pub fn get(&self, participant_id: &Identifier) -> Option<Arc<ConnectionHandle>> {
        self.by_participant
            .get(participant_id)
            .map(|entry| entry.value().clone())
    }

    /// Whether the participant has a registered connection.
    pub fn contains(&self, participant_id: &Identifier) -> bool {
        self.by_participant.contains_key(participant_id)
    }

    /// All admin connections.
    pub fn admins(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_participant
            .iter()
            .filter(|entry| entry.value().is_admin())
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.by_participant.len()
    }

    /// Removes every connection.
    pub fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let all: Vec<_> = self
            .by_participant
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.by_participant.clear();
        all
    }
}
