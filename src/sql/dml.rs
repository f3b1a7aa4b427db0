use crate::core::{OrmError, Result, Value};
use crate::metadata::{ColumnData, EntityMetadata};
use crate::sql::to_sql_literal;

pub struct InsertQueryBuilder<'a> {
    metadata: &'a EntityMetadata,
}

impl<'a> InsertQueryBuilder<'a> {
    pub fn new(metadata: &'a EntityMetadata) -> Self {
        Self { metadata }
    }

    /// `INSERT INTO t (c1, c2) VALUES (v1, v2);`
    ///
    /// A generated identifier without a value is left out so storage assigns it.
    pub fn build(&self, columns: &[ColumnData]) -> Result<String> {
        let mut names = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());

        for column in columns {
            let meta = self.metadata.column(&column.name).ok_or_else(|| {
                OrmError::ColumnNotFound(column.name.clone(), self.metadata.table_name().to_string())
            })?;
            if meta.generated && column.value.is_null() {
                continue;
            }
            names.push(column.name.as_str());
            values.push(to_sql_literal(&column.value)?);
        }

        // Entities made of a generated id alone still need one column in the list.
        if names.is_empty() {
            names.push(self.metadata.id_column().name.as_str());
            values.push(to_sql_literal(&Value::Null)?);
        }

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.metadata.table_name(),
            names.join(", "),
            values.join(", ")
        ))
    }
}

pub struct SelectByIdQueryBuilder<'a> {
    metadata: &'a EntityMetadata,
}

impl<'a> SelectByIdQueryBuilder<'a> {
    pub fn new(metadata: &'a EntityMetadata) -> Self {
        Self { metadata }
    }

    pub fn build(&self, id: &Value) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {} WHERE {} = {};",
            self.metadata.column_names().join(", "),
            self.metadata.table_name(),
            self.metadata.id_column().name,
            to_sql_literal(id)?
        ))
    }
}

pub struct SelectAllQueryBuilder<'a> {
    metadata: &'a EntityMetadata,
}

impl<'a> SelectAllQueryBuilder<'a> {
    pub fn new(metadata: &'a EntityMetadata) -> Self {
        Self { metadata }
    }

    pub fn build(&self) -> String {
        format!(
            "SELECT {} FROM {};",
            self.metadata.column_names().join(", "),
            self.metadata.table_name()
        )
    }
}

pub struct UpdateQueryBuilder<'a> {
    metadata: &'a EntityMetadata,
}

impl<'a> UpdateQueryBuilder<'a> {
    pub fn new(metadata: &'a EntityMetadata) -> Self {
        Self { metadata }
    }

    /// `UPDATE t SET c1=v1, c2=v2 WHERE id = x;` over the given columns.
    /// The identifier column is never assigned.
    pub fn build(&self, columns: &[ColumnData], id: &Value) -> Result<String> {
        let id_column = &self.metadata.id_column().name;
        let mut assignments = Vec::with_capacity(columns.len());
        for column in columns {
            if &column.name == id_column {
                continue;
            }
            if self.metadata.column(&column.name).is_none() {
                return Err(OrmError::ColumnNotFound(
                    column.name.clone(),
                    self.metadata.table_name().to_string(),
                ));
            }
            assignments.push(format!("{}={}", column.name, to_sql_literal(&column.value)?));
        }

        if assignments.is_empty() {
            return Err(OrmError::UsageError(format!(
                "UPDATE of '{}' has no column to set",
                self.metadata.table_name()
            )));
        }

        Ok(format!(
            "UPDATE {} SET {} WHERE {} = {};",
            self.metadata.table_name(),
            assignments.join(", "),
            id_column,
            to_sql_literal(id)?
        ))
    }
}

pub struct DeleteQueryBuilder<'a> {
    metadata: &'a EntityMetadata,
}

impl<'a> DeleteQueryBuilder<'a> {
    pub fn new(metadata: &'a EntityMetadata) -> Self {
        Self { metadata }
    }

    pub fn build_by_id(&self, id: &Value) -> Result<String> {
        Ok(format!(
            "DELETE FROM {} WHERE {} = {};",
            self.metadata.table_name(),
            self.metadata.id_column().name,
            to_sql_literal(id)?
        ))
    }

    /// `DELETE FROM t WHERE a = x AND b = y;` with conditions in column order.
    pub fn build(&self, conditions: &[ColumnData]) -> Result<String> {
        if conditions.is_empty() {
            return Err(OrmError::UsageError(format!(
                "DELETE from '{}' without conditions",
                self.metadata.table_name()
            )));
        }

        let mut ordered = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let idx = self.metadata.column_index(&condition.name).ok_or_else(|| {
                OrmError::ColumnNotFound(condition.name.clone(), self.metadata.table_name().to_string())
            })?;
            ordered.push((idx, condition));
        }
        ordered.sort_by_key(|(idx, _)| *idx);

        let predicates = ordered
            .into_iter()
            .map(|(_, condition)| -> Result<String> {
                match &condition.value {
                    Value::Null => Ok(format!("{} IS NULL", condition.name)),
                    value => Ok(format!("{} = {}", condition.name, to_sql_literal(value)?)),
                }
            })
            .collect::<Result<Vec<String>>>()?;

        Ok(format!(
            "DELETE FROM {} WHERE {};",
            self.metadata.table_name(),
            predicates.join(" AND ")
        ))
    }
}
