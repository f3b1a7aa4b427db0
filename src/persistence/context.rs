use std::collections::HashMap;

use crate::persistence::{EntityData, EntityEntry, EntityKey, EntityStatus};

/// Identity map, synchronized-state snapshots and lifecycle status of every
/// entity seen in one session. Pure bookkeeping: nothing here talks to storage.
///
/// A key whose entry is `Managed` always has both an entity and a snapshot.
#[derive(Debug, Default)]
pub struct PersistenceContext {
    entities: HashMap<EntityKey, EntityData>,
    snapshots: HashMap<EntityKey, EntityData>,
    entries: HashMap<EntityKey, EntityEntry>,
}

impl PersistenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_entity(&self, key: &EntityKey) -> Option<&EntityData> {
        self.entities.get(key)
    }

    pub fn insert_entity(&mut self, key: EntityKey, data: EntityData) {
        self.entities.insert(key, data);
    }

    /// Drops the tracked instance only; the entry map keeps its status.
    pub fn delete_entity(&mut self, key: &EntityKey) -> Option<EntityData> {
        self.entities.remove(key)
    }

    pub fn insert_database_snapshot(&mut self, key: EntityKey, data: EntityData) {
        self.snapshots.insert(key, data);
    }

    pub fn database_snapshot(&self, key: &EntityKey) -> Option<&EntityData> {
        self.snapshots.get(key)
    }

    pub fn insert_entity_entry(&mut self, key: EntityKey, status: EntityStatus) {
        self.entries.insert(key, EntityEntry::new(status));
    }

    pub fn entity_entry(&self, key: &EntityKey) -> Option<&EntityEntry> {
        self.entries.get(key)
    }

    pub fn status(&self, key: &EntityKey) -> Option<EntityStatus> {
        self.entries.get(key).map(EntityEntry::status)
    }

    pub fn is_managed(&self, key: &EntityKey) -> bool {
        self.entries.get(key).is_some_and(EntityEntry::is_managed)
    }

    pub fn managed_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_managed()).count()
    }

    /// Number of keys with an entry, tombstones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&EntityKey, &EntityEntry)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.snapshots.clear();
        self.entries.clear();
    }
}
