use crate::core::{OrmError, Result, Value};
use crate::metadata::Entity;
use crate::persistence::EntityType;
use crate::sql::{SelectAllQueryBuilder, SelectByIdQueryBuilder};
use crate::template::{SqlExecutor, SqlTemplate};

/// Reads entities from storage. Knows nothing about the persistence context.
#[derive(Debug, Default)]
pub struct EntityLoader;

impl EntityLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads the single row with identifier `id`.
    pub fn find<E: Entity, X: SqlExecutor>(&self, template: &mut SqlTemplate<X>, id: &Value) -> Result<E> {
        let sql = SelectByIdQueryBuilder::new(E::metadata()).build(id)?;

        template
            .query_for_object(&sql, |row| E::from_row(row))
            .map_err(|e| match e {
                OrmError::EmptyResult => OrmError::NotFound {
                    entity: EntityType::of::<E>().name().to_string(),
                    id: id.clone(),
                },
                OrmError::IncorrectResultSize(rows) => OrmError::Ambiguous {
                    entity: EntityType::of::<E>().name().to_string(),
                    id: id.clone(),
                    rows,
                },
                other => other,
            })
    }

    /// Loads every row of the entity's table in storage order.
    pub fn find_all<E: Entity, X: SqlExecutor>(&self, template: &mut SqlTemplate<X>) -> Result<Vec<E>> {
        let sql = SelectAllQueryBuilder::new(E::metadata()).build();
        template.query(&sql, |row| E::from_row(row))
    }
}
