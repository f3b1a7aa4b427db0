use serde::Serialize;

use crate::config::OrmConfig;
use crate::core::{OrmError, Result, Value};
use crate::metadata::Entity;
use crate::persistence::{
    EntityData, EntityKey, EntityLoader, EntityPersister, EntityStatus, PersistenceContext,
};
use crate::sql::{CreateQueryBuilder, DropQueryBuilder};
use crate::template::{SqlExecutor, SqlTemplate};

/// What a [`EntityManager::merge`] call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MergeOutcome {
    /// The key is not managed by this session; nothing was written
    Unmanaged,
    /// No column differs from the synchronized state; nothing was written
    Unchanged,
    /// One UPDATE was issued for these columns
    Updated(Vec<String>),
}

impl MergeOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// One unit of work: a persistence context bound to a SQL executor.
///
/// Operations run synchronously and in program order. A failed operation
/// leaves the context as it was.
pub struct EntityManager<X: SqlExecutor> {
    template: SqlTemplate<X>,
    loader: EntityLoader,
    persister: EntityPersister,
    context: PersistenceContext,
    config: OrmConfig,
}

impl<X: SqlExecutor> EntityManager<X> {
    pub fn new(executor: X) -> Self {
        Self::with_config(executor, OrmConfig::default())
    }

    pub fn with_config(executor: X, config: OrmConfig) -> Self {
        Self {
            template: SqlTemplate::new(executor).with_show_sql(config.show_sql),
            loader: EntityLoader::new(),
            persister: EntityPersister::new(),
            context: PersistenceContext::new(),
            config,
        }
    }

    /// Returns the entity with identifier `id`.
    ///
    /// A managed key is answered from the identity map without touching
    /// storage. A key removed in this session fails with `NotFound`, also
    /// without touching storage.
    pub fn find<E: Entity>(&mut self, id: impl Into<Value>) -> Result<E> {
        let key = EntityKey::of::<E>(id);

        match self.context.status(&key) {
            Some(EntityStatus::Managed) => {
                tracing::trace!(%key, "identity map hit");
                return self.cached::<E>(&key);
            }
            Some(EntityStatus::Deleted) => {
                tracing::debug!(%key, "find on removed entity");
                return Err(not_found(&key));
            }
            None => {}
        }

        let entity: E = self.loader.find(&mut self.template, key.id())?;
        self.track(EntityData::from_entity(&entity)?);
        Ok(entity)
    }

    /// Loads every row of `E`'s table.
    ///
    /// Keys already managed yield the tracked instance rather than the stored
    /// row; keys removed in this session are skipped.
    pub fn find_all<E: Entity>(&mut self) -> Result<Vec<E>> {
        let loaded: Vec<E> = self.loader.find_all(&mut self.template)?;

        let mut entities = Vec::with_capacity(loaded.len());
        for entity in loaded {
            let data = EntityData::from_entity(&entity)?;
            let key = data.key();
            match self.context.status(&key) {
                Some(EntityStatus::Managed) => entities.push(self.cached::<E>(&key)?),
                Some(EntityStatus::Deleted) => continue,
                None => {
                    self.track(data);
                    entities.push(entity);
                }
            }
        }
        Ok(entities)
    }

    /// Inserts a new entity and starts tracking it.
    ///
    /// An entity with a NULL generated identifier receives the key storage
    /// assigned. Persisting a key that is already managed is a usage error;
    /// `merge` is the update path.
    pub fn persist<E: Entity>(&mut self, entity: &mut E) -> Result<()> {
        let data = EntityData::from_entity(entity)?;
        let metadata = E::metadata();

        if data.id().is_null() {
            if !metadata.has_generated_id() {
                return Err(OrmError::UsageError(format!(
                    "cannot persist {} without a value for identifier '{}'",
                    data.entity_type().name(),
                    metadata.id_column().name
                )));
            }
        } else if self.context.is_managed(&data.key()) {
            return Err(OrmError::UsageError(format!(
                "{} is already managed; use merge to update it",
                data.key()
            )));
        }

        let generated = self.persister.persist(&mut self.template, &data)?;

        let data = if data.id().is_null() {
            let id = generated.ok_or_else(|| {
                OrmError::InvalidState(format!(
                    "storage generated no identifier for {}",
                    data.entity_type().name()
                ))
            })?;
            entity.assign_id(id)?;
            EntityData::from_entity(entity)?
        } else {
            data
        };

        tracing::debug!(key = %data.key(), "entity persisted");
        self.track(data);
        Ok(())
    }

    /// Writes the columns of a managed entity that changed since it was last
    /// synchronized.
    pub fn merge<E: Entity>(&mut self, entity: &E) -> Result<MergeOutcome> {
        let live = EntityData::from_entity(entity)?;
        let key = live.key();

        if !self.context.is_managed(&key) {
            tracing::debug!(%key, "merge on unmanaged entity ignored");
            return Ok(MergeOutcome::Unmanaged);
        }

        let synchronized = self
            .context
            .database_snapshot(&key)
            .ok_or_else(|| OrmError::InvalidState(format!("{} is managed but has no snapshot", key)))?;
        let diff = live.diff(synchronized)?;

        if diff.is_empty() {
            tracing::trace!(%key, "merge found no changes");
            return Ok(MergeOutcome::Unchanged);
        }

        self.persister.merge(&mut self.template, &diff)?;

        let changed = diff.column_names();
        tracing::debug!(%key, columns = ?changed, "entity merged");
        self.track(live);
        Ok(MergeOutcome::Updated(changed))
    }

    /// Deletes the entity's row and leaves a tombstone for its key.
    pub fn remove<E: Entity>(&mut self, entity: &E) -> Result<()> {
        let data = EntityData::from_entity(entity)?;
        let key = data.key();

        self.persister.remove(&mut self.template, &data)?;

        self.context.delete_entity(&key);
        self.context.insert_entity_entry(key.clone(), EntityStatus::Deleted);
        tracing::debug!(%key, "entity removed");
        Ok(())
    }

    pub fn contains<E: Entity>(&self, id: impl Into<Value>) -> bool {
        self.context.is_managed(&EntityKey::of::<E>(id))
    }

    pub fn status<E: Entity>(&self, id: impl Into<Value>) -> Option<EntityStatus> {
        self.context.status(&EntityKey::of::<E>(id))
    }

    pub fn context(&self) -> &PersistenceContext {
        &self.context
    }

    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    /// Ends the unit of work: forgets every tracked entity and tombstone.
    pub fn clear(&mut self) {
        self.context.clear();
    }

    pub fn template(&self) -> &SqlTemplate<X> {
        &self.template
    }

    pub fn template_mut(&mut self) -> &mut SqlTemplate<X> {
        &mut self.template
    }

    pub fn into_executor(self) -> X {
        self.template.into_inner()
    }

    pub fn create_table<E: Entity>(&mut self) -> Result<()> {
        let sql = CreateQueryBuilder::new(E::metadata(), self.config.dialect)
            .if_not_exists(self.config.ddl_if_not_exists)
            .varchar_length(self.config.default_varchar_length)
            .build();
        self.template.execute(&sql)?;
        Ok(())
    }

    pub fn drop_table<E: Entity>(&mut self) -> Result<()> {
        let sql = DropQueryBuilder::new(E::metadata())
            .if_exists(self.config.ddl_if_exists)
            .build();
        self.template.execute(&sql)?;
        Ok(())
    }

    fn cached<E: Entity>(&self, key: &EntityKey) -> Result<E> {
        self.context
            .find_entity(key)
            .and_then(EntityData::instance::<E>)
            .cloned()
            .ok_or_else(|| OrmError::InvalidState(format!("{} is managed but not in the identity map", key)))
    }

    /// Records `data` as both the current and the synchronized state of its key.
    fn track(&mut self, data: EntityData) {
        let key = data.key();
        self.context.insert_database_snapshot(key.clone(), data.clone());
        self.context.insert_entity(key.clone(), data);
        self.context.insert_entity_entry(key, EntityStatus::Managed);
    }
}

fn not_found(key: &EntityKey) -> OrmError {
    OrmError::NotFound {
        entity: key.entity_type().name().to_string(),
        id: key.id().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::InMemoryDB;
    use crate::persistence::fixtures::Account;

    fn manager() -> EntityManager<InMemoryDB> {
        let mut em = EntityManager::new(InMemoryDB::new());
        em.create_table::<Account>().unwrap();
        em
    }

    fn statements(em: &EntityManager<InMemoryDB>) -> Vec<String> {
        em.template().executor().executed_statements().to_vec()
    }

    #[test]
    fn test_find_missing_row_creates_no_entry() {
        let mut em = manager();
        let err = em.find::<Account>(42).unwrap_err();
        assert!(matches!(err, OrmError::NotFound { ref entity, .. } if entity == "Account"));
        assert!(em.context().is_empty());
    }

    #[test]
    fn test_persist_requires_identifier_when_not_generated() {
        let mut em = manager();
        let mut account = Account::new(None, "owner", 10);

        let err = em.persist(&mut account).unwrap_err();
        assert!(matches!(err, OrmError::UsageError(_)));
        assert_eq!(statements(&em).len(), 1);
    }

    #[test]
    fn test_failed_insert_leaves_context_untouched() {
        let mut em = manager();
        em.template_mut()
            .execute("INSERT INTO accounts (code, owner, balance) VALUES ('a1', 'x', 1);")
            .unwrap();

        let mut duplicate = Account::new(Some("a1"), "y", 2);
        let err = em.persist(&mut duplicate).unwrap_err();
        assert!(matches!(err, OrmError::ConstraintViolation(_)));
        assert!(em.status::<Account>("a1").is_none());
    }

    #[test]
    fn test_merge_updates_only_changed_columns() {
        let mut em = manager();
        let mut account = Account::new(Some("a1"), "owner", 10);
        em.persist(&mut account).unwrap();

        account.balance = 25;
        let outcome = em.merge(&account).unwrap();
        assert_eq!(outcome, MergeOutcome::Updated(vec!["balance".to_string()]));
        assert_eq!(
            statements(&em).last().map(String::as_str),
            Some("UPDATE accounts SET balance=25 WHERE code = 'a1';")
        );

        assert_eq!(em.merge(&account).unwrap(), MergeOutcome::Unchanged);
    }

    #[test]
    fn test_find_all_prefers_tracked_instances() {
        let mut em = manager();
        em.template_mut()
            .execute("INSERT INTO accounts (code, owner, balance) VALUES ('a1', 'x', 1), ('a2', 'y', 2), ('a3', 'z', 3);")
            .unwrap();

        let tracked: Account = em.find("a1").unwrap();
        let doomed: Account = em.find("a2").unwrap();
        em.remove(&doomed).unwrap();

        let all = em.find_all::<Account>().unwrap();
        let codes: Vec<_> = all.iter().map(|a| a.code.clone().unwrap_or_default()).collect();
        assert_eq!(codes, vec!["a1", "a3"]);
        assert_eq!(all[0], tracked);
        assert_eq!(em.context().managed_count(), 2);
    }

    #[test]
    fn test_drop_table_honours_if_exists() {
        let config = OrmConfig::new().ddl_if_exists(true);
        let mut em = EntityManager::with_config(InMemoryDB::new(), config);
        em.create_table::<Account>().unwrap();

        em.drop_table::<Account>().unwrap();
        em.drop_table::<Account>().unwrap();

        assert!(!em.template().executor().table_exists("accounts"));
        assert_eq!(
            statements(&em).last().map(String::as_str),
            Some("DROP TABLE IF EXISTS accounts;")
        );

        let mut strict = manager();
        strict.drop_table::<Account>().unwrap();
        assert!(matches!(
            strict.drop_table::<Account>().unwrap_err(),
            OrmError::TableNotFound(_)
        ));
    }

    #[test]
    fn test_clear_forgets_tombstones() {
        let mut em = manager();
        let mut account = Account::new(Some("a1"), "owner", 10);
        em.persist(&mut account).unwrap();
        em.remove(&account).unwrap();
        em.clear();

        assert!(em.context().is_empty());
        assert!(em.find::<Account>("a1").unwrap_err().is_not_found());
    }
}
