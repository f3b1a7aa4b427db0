use serde::{Deserialize, Serialize};

use crate::metadata::{ColumnMetadata, EntityMetadata, SqlType};

/// SQL flavor of generated DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dialect {
    #[default]
    H2,
    Postgres,
}

impl Dialect {
    fn type_name(&self, sql_type: SqlType, length: u32) -> String {
        match (self, sql_type) {
            (_, SqlType::BigInt) => "BIGINT".to_string(),
            (_, SqlType::Integer) => "INTEGER".to_string(),
            (_, SqlType::Varchar) => format!("VARCHAR({})", length),
            (_, SqlType::Boolean) => "BOOLEAN".to_string(),
            (Self::H2, SqlType::Double) => "DOUBLE".to_string(),
            (Self::Postgres, SqlType::Double) => "DOUBLE PRECISION".to_string(),
        }
    }

    fn identity_clause(&self) -> &'static str {
        match self {
            Self::H2 => "AUTO_INCREMENT",
            Self::Postgres => "GENERATED BY DEFAULT AS IDENTITY",
        }
    }
}

pub struct CreateQueryBuilder<'a> {
    metadata: &'a EntityMetadata,
    dialect: Dialect,
    if_not_exists: bool,
    varchar_length: u32,
}

impl<'a> CreateQueryBuilder<'a> {
    pub fn new(metadata: &'a EntityMetadata, dialect: Dialect) -> Self {
        Self {
            metadata,
            dialect,
            if_not_exists: false,
            varchar_length: 255,
        }
    }

    pub fn if_not_exists(mut self, enabled: bool) -> Self {
        self.if_not_exists = enabled;
        self
    }

    /// Length for VARCHAR columns that declare none.
    pub fn varchar_length(mut self, length: u32) -> Self {
        self.varchar_length = length;
        self
    }

    pub fn build(&self) -> String {
        let columns: Vec<String> = self
            .metadata
            .columns()
            .iter()
            .map(|column| self.column_definition(column))
            .collect();

        format!(
            "CREATE TABLE {}{} ({});",
            if self.if_not_exists { "IF NOT EXISTS " } else { "" },
            self.metadata.table_name(),
            columns.join(", ")
        )
    }

    fn column_definition(&self, column: &ColumnMetadata) -> String {
        let length = column.length.unwrap_or(self.varchar_length);
        let mut parts = vec![
            column.name.clone(),
            self.dialect.type_name(column.sql_type, length),
        ];
        if !column.nullable || column.primary_key {
            parts.push("NOT NULL".to_string());
        }
        if column.generated {
            parts.push(self.dialect.identity_clause().to_string());
        }
        if column.primary_key {
            parts.push("PRIMARY KEY".to_string());
        }
        parts.join(" ")
    }
}

pub struct DropQueryBuilder<'a> {
    metadata: &'a EntityMetadata,
    if_exists: bool,
}

impl<'a> DropQueryBuilder<'a> {
    pub fn new(metadata: &'a EntityMetadata) -> Self {
        Self {
            metadata,
            if_exists: false,
        }
    }

    pub fn if_exists(mut self, enabled: bool) -> Self {
        self.if_exists = enabled;
        self
    }

    pub fn build(&self) -> String {
        format!(
            "DROP TABLE {}{};",
            if self.if_exists { "IF EXISTS " } else { "" },
            self.metadata.table_name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users(generated: bool) -> EntityMetadata {
        let mut id = ColumnMetadata::new("id", SqlType::BigInt).primary_key();
        if generated {
            id = id.generated();
        }
        EntityMetadata::builder("users")
            .column(id)
            .column(ColumnMetadata::new("nick_name", SqlType::Varchar))
            .column(ColumnMetadata::new("old", SqlType::Integer))
            .column(ColumnMetadata::new("email", SqlType::Varchar).not_null())
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_h2() {
        let metadata = users(true);
        assert_eq!(
            CreateQueryBuilder::new(&metadata, Dialect::H2).build(),
            "CREATE TABLE users (id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY, nick_name VARCHAR(255), old INTEGER, email VARCHAR(255) NOT NULL);"
        );
    }

    #[test]
    fn test_create_without_generated_id() {
        let metadata = users(false);
        let sql = CreateQueryBuilder::new(&metadata, Dialect::H2).build();
        assert!(sql.starts_with("CREATE TABLE users (id BIGINT NOT NULL PRIMARY KEY, "));
    }

    #[test]
    fn test_create_postgres_if_not_exists() {
        let metadata = EntityMetadata::builder("scores")
            .column(ColumnMetadata::new("id", SqlType::BigInt).primary_key().generated())
            .column(ColumnMetadata::new("value", SqlType::Double))
            .column(ColumnMetadata::new("label", SqlType::Varchar).length(40))
            .build()
            .unwrap();

        assert_eq!(
            CreateQueryBuilder::new(&metadata, Dialect::Postgres)
                .if_not_exists(true)
                .build(),
            "CREATE TABLE IF NOT EXISTS scores (id BIGINT NOT NULL GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, value DOUBLE PRECISION, label VARCHAR(40));"
        );
    }

    #[test]
    fn test_drop() {
        let metadata = users(true);
        assert_eq!(DropQueryBuilder::new(&metadata).build(), "DROP TABLE users;");
        assert_eq!(
            DropQueryBuilder::new(&metadata).if_exists(true).build(),
            "DROP TABLE IF EXISTS users;"
        );
    }
}
