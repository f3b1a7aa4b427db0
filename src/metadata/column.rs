use serde::{Deserialize, Serialize};

use crate::core::Value;

/// Declared SQL type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    BigInt,
    Integer,
    Varchar,
    Boolean,
    Double,
}

/// One persistent field of an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    /// Rust field the column is read from
    pub field: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Identifier assigned by storage on insert
    pub generated: bool,
    /// VARCHAR length; `None` falls back to the configured default
    pub length: Option<u32>,
}

impl ColumnMetadata {
    /// Nullable, non-key column whose field name equals the column name.
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        let name = name.into();
        Self {
            field: name.clone(),
            name,
            sql_type,
            nullable: true,
            primary_key: false,
            generated: false,
            length: None,
        }
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }
}

/// A column name paired with the value an entity holds for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnData {
    pub name: String,
    pub value: Value,
}

impl ColumnData {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
