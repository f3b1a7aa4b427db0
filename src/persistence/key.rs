use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::Value;
use crate::metadata::{Entity, EntityMetadata};

/// Runtime handle of an entity type. Compared by `TypeId`; the name and
/// metadata ride along for statements and diagnostics.
#[derive(Clone, Copy)]
pub struct EntityType {
    type_id: TypeId,
    name: &'static str,
    metadata: &'static EntityMetadata,
}

impl EntityType {
    pub fn of<E: Entity>() -> Self {
        let full = std::any::type_name::<E>();
        Self {
            type_id: TypeId::of::<E>(),
            name: full.rsplit("::").next().unwrap_or(full),
            metadata: E::metadata(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn metadata(&self) -> &'static EntityMetadata {
        self.metadata
    }

    pub fn is<E: Entity>(&self) -> bool {
        self.type_id == TypeId::of::<E>()
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity-map key: entity type plus identifier value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    id: Value,
    entity_type: EntityType,
}

impl EntityKey {
    pub fn new(id: Value, entity_type: EntityType) -> Self {
        Self { id, entity_type }
    }

    pub fn of<E: Entity>(id: impl Into<Value>) -> Self {
        Self::new(id.into(), EntityType::of::<E>())
    }

    pub fn id(&self) -> &Value {
        &self.id
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity_type.name, self.id)
    }
}
