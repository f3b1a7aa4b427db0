use thiserror::Error;

use super::Value;

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Expected exactly one row, query returned none")]
    EmptyResult,

    #[error("Expected exactly one row, query returned {0}")]
    IncorrectResultSize(usize),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: String, id: Value },

    #[error("{entity} with id {id} matched {rows} rows")]
    Ambiguous { entity: String, id: Value, rows: usize },

    #[error("Usage error: {0}")]
    UsageError(String),

    #[error("Schema mismatch for '{entity}': {detail}")]
    SchemaMismatch { entity: String, detail: String },

    #[error("Invalid entity metadata: {0}")]
    InvalidMetadata(String),

    #[error("Mapping error: {0}")]
    MappingError(String),

    #[error("Invalid persistence context state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, OrmError>;

impl OrmError {
    /// True for the failures a loader reports when the requested row is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::EmptyResult)
    }
}
