use crate::core::{OrmError, Result, Value};
use crate::persistence::EntityData;
use crate::sql::{DeleteQueryBuilder, InsertQueryBuilder, UpdateQueryBuilder};
use crate::template::{SqlExecutor, SqlTemplate};

/// Writes snapshots to storage, one statement per call.
#[derive(Debug, Default)]
pub struct EntityPersister;

impl EntityPersister {
    pub fn new() -> Self {
        Self
    }

    /// Inserts the snapshot and returns the identifier storage generated, if any.
    pub fn persist<X: SqlExecutor>(&self, template: &mut SqlTemplate<X>, data: &EntityData) -> Result<Option<Value>> {
        let metadata = data.entity_type().metadata();
        let sql = InsertQueryBuilder::new(metadata).build(data.columns())?;
        let result = template.execute(&sql)?;
        Ok(result.generated_key)
    }

    /// Updates the columns carried by `diff` on the row of its identifier.
    pub fn merge<X: SqlExecutor>(&self, template: &mut SqlTemplate<X>, diff: &EntityData) -> Result<usize> {
        let metadata = diff.entity_type().metadata();
        let sql = UpdateQueryBuilder::new(metadata).build(diff.columns(), diff.id())?;
        Ok(template.execute(&sql)?.affected_rows())
    }

    pub fn remove<X: SqlExecutor>(&self, template: &mut SqlTemplate<X>, data: &EntityData) -> Result<usize> {
        if data.id().is_null() {
            return Err(OrmError::UsageError(format!(
                "cannot remove {} without an identifier",
                data.entity_type().name()
            )));
        }
        let sql = DeleteQueryBuilder::new(data.entity_type().metadata()).build_by_id(data.id())?;
        Ok(template.execute(&sql)?.affected_rows())
    }
}
