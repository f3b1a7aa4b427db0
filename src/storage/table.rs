use crate::core::{Column, OrmError, Result, Row, Schema, Value};
use std::collections::{BTreeMap, HashSet};

/// Row storage for one table. Row ids are assigned in insertion order, so scans
/// return rows in the order they were inserted.
#[derive(Debug, Clone)]
pub struct Table {
    schema: TableSchema,
    rows: BTreeMap<usize, Row>,
    next_row_id: usize,
    next_identity: i64,
}

impl Table {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
            next_row_id: 0,
            next_identity: 1,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Fills NULL identity columns from the table counter and returns the
    /// generated value, if any. Explicit identity values move the counter past them.
    pub fn assign_identity(&mut self, row: &mut Row) -> Result<Option<Value>> {
        let mut generated = None;
        for (idx, column) in self.schema.schema().columns().iter().enumerate() {
            if !column.auto_increment {
                continue;
            }
            match row[idx].as_i64() {
                Some(explicit) => {
                    self.next_identity = self.next_identity.max(explicit.saturating_add(1));
                }
                None if row[idx].is_null() => {
                    let value = self.next_identity;
                    self.next_identity = value.checked_add(1).ok_or_else(|| {
                        OrmError::ConstraintViolation(format!(
                            "Identity column '{}' has no values left",
                            column.name
                        ))
                    })?;
                    row[idx] = Value::Integer(value);
                    generated = Some(row[idx].clone());
                }
                None => {}
            }
        }
        Ok(generated)
    }

    pub fn insert(&mut self, row: Row) -> Result<usize> {
        self.check_batch(&[&row], &HashSet::new())?;
        Ok(self.push_row(row))
    }

    /// Assigns identities and stores every row, or stores none of them.
    /// Returns the last generated identity.
    pub fn insert_all(&mut self, mut rows: Vec<Row>) -> Result<Option<Value>> {
        let counter = self.next_identity;
        match self.stage_inserts(&mut rows) {
            Ok(generated) => {
                for row in rows {
                    self.push_row(row);
                }
                Ok(generated)
            }
            Err(err) => {
                self.next_identity = counter;
                Err(err)
            }
        }
    }

    pub fn update(&mut self, id: usize, new_row: Row) -> Result<bool> {
        Ok(self.update_all(vec![(id, new_row)])? == 1)
    }

    /// Replaces every listed row, or none of them. Returns how many ids existed.
    pub fn update_all(&mut self, updates: Vec<(usize, Row)>) -> Result<usize> {
        let replaced: HashSet<usize> = updates.iter().map(|(id, _)| *id).collect();
        let new_rows: Vec<&Row> = updates.iter().map(|(_, row)| row).collect();
        self.check_batch(&new_rows, &replaced)?;

        let mut updated = 0;
        for (id, new_row) in updates {
            if let Some(row) = self.rows.get_mut(&id) {
                *row = new_row;
                updated += 1;
            }
        }
        Ok(updated)
    }

    pub fn delete(&mut self, id: usize) -> bool {
        self.rows.remove(&id).is_some()
    }

    pub fn scan(&self) -> Vec<Row> {
        self.rows.values().cloned().collect()
    }

    pub fn scan_with_ids(&self) -> Vec<(usize, Row)> {
        self.rows.iter().map(|(id, row)| (*id, row.clone())).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn stage_inserts(&mut self, rows: &mut [Row]) -> Result<Option<Value>> {
        let mut generated = None;
        for row in rows.iter_mut() {
            if let Some(key) = self.assign_identity(row)? {
                generated = Some(key);
            }
        }
        self.check_batch(&rows.iter().collect::<Vec<_>>(), &HashSet::new())?;
        Ok(generated)
    }

    fn push_row(&mut self, row: Row) -> usize {
        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.insert(id, row);
        id
    }

    /// Checks `rows` as if they were written together, with the stored rows
    /// in `replaced` already gone.
    fn check_batch(&self, rows: &[&Row], replaced: &HashSet<usize>) -> Result<()> {
        for row in rows {
            self.validate_row(row)?;
        }

        for (col_idx, column) in self.schema.schema().columns().iter().enumerate() {
            if !column.primary_key {
                continue;
            }

            let mut taken: HashSet<&Value> = self
                .rows
                .iter()
                .filter(|(id, _)| !replaced.contains(*id))
                .map(|(_, existing)| &existing[col_idx])
                .filter(|value| !value.is_null())
                .collect();

            for row in rows {
                let value = &row[col_idx];
                if !value.is_null() && !taken.insert(value) {
                    return Err(OrmError::ConstraintViolation(format!(
                        "Unique constraint violation: Column '{}' already contains value {}",
                        column.name, value
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        let columns = self.schema.schema().columns();
        if row.len() != columns.len() {
            return Err(OrmError::ExecutionError(format!(
                "Expected {} columns, got {}",
                columns.len(),
                row.len()
            )));
        }
        for (column, value) in columns.iter().zip(row.iter()) {
            column.validate(value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    name: String,
    schema: Schema,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            schema: Schema::new(columns),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.columns().iter().map(|c| c.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;

    fn users_table() -> Table {
        Table::new(TableSchema::new(
            "users",
            vec![
                Column::new("id", DataType::Integer).primary_key().auto_increment(),
                Column::new("name", DataType::Text).not_null(),
            ],
        ))
    }

    #[test]
    fn test_insert_rejects_duplicate_primary_key() {
        let mut table = users_table();
        table.insert(vec![Value::Integer(1), Value::from("a")]).unwrap();

        let err = table.insert(vec![Value::Integer(1), Value::from("b")]).unwrap_err();
        assert!(matches!(err, OrmError::ConstraintViolation(_)));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_insert_rejects_null_in_not_null_column() {
        let mut table = users_table();
        let err = table.insert(vec![Value::Integer(1), Value::Null]).unwrap_err();
        assert!(matches!(err, OrmError::ConstraintViolation(_)));
    }

    #[test]
    fn test_identity_counter() {
        let mut table = users_table();

        let mut first = vec![Value::Null, Value::from("a")];
        assert_eq!(table.assign_identity(&mut first).unwrap(), Some(Value::Integer(1)));
        table.insert(first).unwrap();

        let mut explicit = vec![Value::Integer(10), Value::from("b")];
        assert_eq!(table.assign_identity(&mut explicit).unwrap(), None);
        table.insert(explicit).unwrap();

        let mut next = vec![Value::Null, Value::from("c")];
        assert_eq!(table.assign_identity(&mut next).unwrap(), Some(Value::Integer(11)));
    }

    #[test]
    fn test_identity_exhaustion_is_an_error() {
        let mut table = users_table();
        table
            .insert_all(vec![vec![Value::Integer(i64::MAX), Value::from("last")]])
            .unwrap();

        let err = table
            .insert_all(vec![vec![Value::Null, Value::from("overflow")]])
            .unwrap_err();

        assert!(matches!(err, OrmError::ConstraintViolation(_)));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_insert_all_is_all_or_nothing() {
        let mut table = users_table();
        table
            .insert_all(vec![vec![Value::Integer(2), Value::from("b")]])
            .unwrap();

        let err = table
            .insert_all(vec![
                vec![Value::Null, Value::from("x")],
                vec![Value::Integer(2), Value::from("dup")],
            ])
            .unwrap_err();
        assert!(matches!(err, OrmError::ConstraintViolation(_)));
        assert_eq!(table.row_count(), 1);

        // the failed batch did not consume identities
        let generated = table
            .insert_all(vec![vec![Value::Null, Value::from("c")]])
            .unwrap();
        assert_eq!(generated, Some(Value::Integer(3)));
    }

    #[test]
    fn test_insert_all_rejects_duplicates_within_batch() {
        let mut table = users_table();
        let err = table
            .insert_all(vec![
                vec![Value::Integer(7), Value::from("a")],
                vec![Value::Integer(7), Value::from("b")],
            ])
            .unwrap_err();

        assert!(matches!(err, OrmError::ConstraintViolation(_)));
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_update_all_is_all_or_nothing() {
        let mut table = users_table();
        let first = table.insert(vec![Value::Integer(1), Value::from("a")]).unwrap();
        let second = table.insert(vec![Value::Integer(2), Value::from("b")]).unwrap();

        let err = table
            .update_all(vec![
                (first, vec![Value::Integer(5), Value::from("a")]),
                (second, vec![Value::Integer(5), Value::from("b")]),
            ])
            .unwrap_err();
        assert!(matches!(err, OrmError::ConstraintViolation(_)));
        assert_eq!(table.scan()[0][0], Value::Integer(1));

        // swapping keys is fine when checked as one batch
        let updated = table
            .update_all(vec![
                (first, vec![Value::Integer(2), Value::from("a")]),
                (second, vec![Value::Integer(1), Value::from("b")]),
            ])
            .unwrap();
        assert_eq!(updated, 2);
        assert_eq!(table.scan()[0][0], Value::Integer(2));
    }

    #[test]
    fn test_update_allows_same_key_on_same_row() {
        let mut table = users_table();
        let id = table.insert(vec![Value::Integer(1), Value::from("a")]).unwrap();

        assert!(table.update(id, vec![Value::Integer(1), Value::from("b")]).unwrap());
        assert_eq!(table.scan()[0][1], Value::from("b"));
    }
}
