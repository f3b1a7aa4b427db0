use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityStatus {
    /// Tracked by the context and backed by a stored row
    Managed,
    /// Removed in this session; the entry stays as a tombstone
    Deleted,
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Managed => write!(f, "MANAGED"),
            Self::Deleted => write!(f, "DELETED"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEntry {
    status: EntityStatus,
}

impl EntityEntry {
    pub fn new(status: EntityStatus) -> Self {
        Self { status }
    }

    pub fn status(&self) -> EntityStatus {
        self.status
    }

    pub fn is_managed(&self) -> bool {
        self.status == EntityStatus::Managed
    }

    pub fn is_deleted(&self) -> bool {
        self.status == EntityStatus::Deleted
    }
}
