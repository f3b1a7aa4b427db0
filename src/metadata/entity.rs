use std::collections::HashSet;

use crate::core::{OrmError, Result, Value};
use crate::metadata::{ColumnMetadata, ColumnValue};
use crate::template::ResultRow;

/// Mapping of one entity type onto a table: the table name, the persistent
/// columns in declaration order, and which of them is the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    table_name: String,
    columns: Vec<ColumnMetadata>,
    id_index: usize,
}

impl EntityMetadata {
    /// Assembles metadata whose invariants were already checked at compile time.
    #[doc(hidden)]
    pub fn from_parts(table_name: impl Into<String>, columns: Vec<ColumnMetadata>, id_index: usize) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            id_index,
        }
    }

    pub fn builder(table_name: impl Into<String>) -> EntityMetadataBuilder {
        EntityMetadataBuilder {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    pub fn id_column(&self) -> &ColumnMetadata {
        &self.columns[self.id_index]
    }

    pub fn id_index(&self) -> usize {
        self.id_index
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_generated_id(&self) -> bool {
        self.id_column().generated
    }
}

/// Registration-time construction of [`EntityMetadata`] for types that do not
/// use the derive macro.
#[derive(Debug)]
pub struct EntityMetadataBuilder {
    table_name: String,
    columns: Vec<ColumnMetadata>,
}

impl EntityMetadataBuilder {
    pub fn column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    pub fn build(self) -> Result<EntityMetadata> {
        if self.table_name.trim().is_empty() {
            return Err(OrmError::InvalidMetadata("table name is empty".into()));
        }
        if self.columns.is_empty() {
            return Err(OrmError::InvalidMetadata(format!(
                "entity '{}' declares no columns",
                self.table_name
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(OrmError::InvalidMetadata(format!(
                    "column '{}' declared twice in '{}'",
                    column.name, self.table_name
                )));
            }
        }

        let keys: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(idx, _)| idx)
            .collect();
        let id_index = match keys.as_slice() {
            [idx] => *idx,
            [] => {
                return Err(OrmError::InvalidMetadata(format!(
                    "entity '{}' has no identifier column",
                    self.table_name
                )));
            }
            _ => {
                return Err(OrmError::InvalidMetadata(format!(
                    "entity '{}' has {} identifier columns, expected one",
                    self.table_name,
                    keys.len()
                )));
            }
        };

        let mut columns = self.columns;
        // An identifier is never NULL once stored.
        columns[id_index].nullable = false;

        Ok(EntityMetadata {
            table_name: self.table_name,
            columns,
            id_index,
        })
    }
}

/// A Rust type mapped onto a table.
///
/// Normally implemented with `#[derive(Entity)]`.
pub trait Entity: Clone + 'static {
    fn metadata() -> &'static EntityMetadata;

    /// Column values in metadata column order.
    fn values(&self) -> Vec<Value>;

    /// Builds an instance from a result row; transient fields take their default.
    fn from_row(row: &ResultRow<'_>) -> Result<Self>;

    /// Writes a storage-generated identifier back into the instance.
    fn assign_id(&mut self, id: Value) -> Result<()>;

    fn id(&self) -> Value {
        self.values()
            .into_iter()
            .nth(Self::metadata().id_index())
            .unwrap_or(Value::Null)
    }
}

/// Decodes `value` into the field type of `column`, naming the column on failure.
#[doc(hidden)]
pub fn decode_column<T: ColumnValue>(column: &str, value: &Value) -> Result<T> {
    T::from_value(value).map_err(|e| match e {
        OrmError::MappingError(detail) => OrmError::MappingError(format!("column '{}': {}", column, detail)),
        other => other,
    })
}
