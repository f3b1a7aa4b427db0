use crate::core::{OrmError, Result, Value};
use crate::metadata::{ColumnValue, decode_column};

/// Borrowed view of one result row with by-name column access.
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> ResultRow<'a> {
    pub fn new(columns: &'a [String], values: &'a [Value]) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn get(&self, column: &str) -> Result<&'a Value> {
        self.columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
            .and_then(|idx| self.values.get(idx))
            .ok_or_else(|| OrmError::MappingError(format!("result has no column '{}'", column)))
    }

    pub fn decode<T: ColumnValue>(&self, column: &str) -> Result<T> {
        decode_column(column, self.get(column)?)
    }
}
