use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::core::{OrmError, Result, Value};
use crate::metadata::{ColumnData, Entity};
use crate::persistence::{EntityKey, EntityType};

/// Immutable capture of an entity's persistent column values.
///
/// The instance copy is shared, so cloning a snapshot or deriving a diff from
/// it never copies the entity again.
#[derive(Clone)]
pub struct EntityData {
    entity_type: EntityType,
    id: Value,
    instance: Rc<dyn Any>,
    columns: Vec<ColumnData>,
}

impl EntityData {
    /// Captures `entity`. Fails when `values()` does not yield exactly one
    /// value per mapped column.
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self> {
        let metadata = E::metadata();
        let values = entity.values();
        if values.len() != metadata.columns().len() {
            return Err(OrmError::MappingError(format!(
                "{} produced {} values for {} mapped columns",
                EntityType::of::<E>().name(),
                values.len(),
                metadata.columns().len()
            )));
        }

        let columns: Vec<ColumnData> = metadata
            .columns()
            .iter()
            .zip(values)
            .map(|(column, value)| ColumnData::new(column.name.clone(), value))
            .collect();
        let id = columns
            .get(metadata.id_index())
            .map(|c| c.value.clone())
            .ok_or_else(|| {
                OrmError::InvalidMetadata(format!(
                    "identifier index {} is out of range for '{}'",
                    metadata.id_index(),
                    metadata.table_name()
                ))
            })?;

        Ok(Self {
            entity_type: EntityType::of::<E>(),
            id,
            instance: Rc::new(entity.clone()),
            columns,
        })
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.id.clone(), self.entity_type)
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn id(&self) -> &Value {
        &self.id
    }

    pub fn columns(&self) -> &[ColumnData] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns.iter().find(|c| c.name == column).map(|c| &c.value)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The captured instance, if it is an `E`.
    pub fn instance<E: Entity>(&self) -> Option<&E> {
        self.instance.downcast_ref::<E>()
    }

    /// Columns of `self` whose value differs from `synchronized`, in `self`'s
    /// order and carrying `self`'s values.
    pub fn diff(&self, synchronized: &EntityData) -> Result<EntityData> {
        if self.columns.len() != synchronized.columns.len() {
            return Err(self.schema_mismatch(format!(
                "snapshot has {} columns, synchronized state has {}",
                self.columns.len(),
                synchronized.columns.len()
            )));
        }

        let previous: HashMap<&str, &Value> = synchronized
            .columns
            .iter()
            .map(|c| (c.name.as_str(), &c.value))
            .collect();

        let mut changed = Vec::new();
        for column in &self.columns {
            let Some(old) = previous.get(column.name.as_str()) else {
                return Err(self.schema_mismatch(format!(
                    "column '{}' is missing from the synchronized state",
                    column.name
                )));
            };
            if *old != &column.value {
                changed.push(column.clone());
            }
        }

        Ok(EntityData {
            entity_type: self.entity_type,
            id: self.id.clone(),
            instance: Rc::clone(&self.instance),
            columns: changed,
        })
    }

    fn schema_mismatch(&self, detail: String) -> OrmError {
        OrmError::SchemaMismatch {
            entity: self.entity_type.name().to_string(),
            detail,
        }
    }
}

impl fmt::Debug for EntityData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityData")
            .field("entity_type", &self.entity_type)
            .field("id", &self.id)
            .field("columns", &self.columns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EntityMetadata;
    use crate::persistence::fixtures::Account;
    use crate::template::ResultRow;

    /// Maps onto the account table but forgets the balance column.
    #[derive(Debug, Clone)]
    struct ShortAccount;

    impl Entity for ShortAccount {
        fn metadata() -> &'static EntityMetadata {
            Account::metadata()
        }

        fn values(&self) -> Vec<Value> {
            vec![Value::from("a1"), Value::from("owner")]
        }

        fn from_row(_row: &ResultRow<'_>) -> Result<Self> {
            Ok(Self)
        }

        fn assign_id(&mut self, _id: Value) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_snapshot_captures_columns_in_order() {
        let account = Account::new(Some("a1"), "owner", 10);
        let data = EntityData::from_entity(&account).unwrap();

        assert_eq!(data.column_names(), vec!["code", "owner", "balance"]);
        assert_eq!(data.id(), &Value::from("a1"));
        assert_eq!(data.instance::<Account>(), Some(&account));
    }

    #[test]
    fn test_snapshot_is_detached_from_live_entity() {
        let mut account = Account::new(Some("a1"), "owner", 10);
        let data = EntityData::from_entity(&account).unwrap();

        account.balance = 99;

        assert_eq!(data.value("balance"), Some(&Value::Integer(10)));
        assert_eq!(data.instance::<Account>().map(|a| a.balance), Some(10));
    }

    #[test]
    fn test_diff_keeps_live_values() {
        let live = EntityData::from_entity(&Account::new(Some("a1"), "new owner", 10)).unwrap();
        let synced = EntityData::from_entity(&Account::new(Some("a1"), "owner", 10)).unwrap();

        let diff = live.diff(&synced).unwrap();
        assert_eq!(diff.columns(), &[ColumnData::new("owner", "new owner")]);
        assert_eq!(diff.key(), live.key());

        assert!(live.diff(&live).unwrap().is_empty());
    }

    #[test]
    fn test_diff_treats_null_as_value() {
        let live = EntityData::from_entity(&Account::new(None, "owner", 10)).unwrap();
        let synced = EntityData::from_entity(&Account::new(Some("a1"), "owner", 10)).unwrap();

        let diff = live.diff(&synced).unwrap();
        assert_eq!(diff.column_names(), vec!["code"]);
    }

    #[test]
    fn test_value_count_must_match_columns() {
        let err = EntityData::from_entity(&ShortAccount).unwrap_err();
        assert!(matches!(err, OrmError::MappingError(ref msg) if msg.contains("2 values for 3")));
    }
}
