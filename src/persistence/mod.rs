//! Unit-of-work engine: identity map, snapshots and the entity lifecycle.

pub mod context;
pub mod data;
pub mod entry;
pub mod key;
pub mod loader;
pub mod manager;
pub mod persister;

#[cfg(test)]
pub(crate) mod fixtures;

pub use context::PersistenceContext;
pub use data::EntityData;
pub use entry::{EntityEntry, EntityStatus};
pub use key::{EntityKey, EntityType};
pub use loader::EntityLoader;
pub use manager::{EntityManager, MergeOutcome};
pub use persister::EntityPersister;
