//! Execution wrapper between the ORM and whatever runs the SQL.

pub mod row;

pub use row::ResultRow;

use crate::core::{OrmError, Result};
use crate::facade::InMemoryDB;
use crate::result::QueryResult;

/// Target that executes complete SQL statement strings.
pub trait SqlExecutor {
    fn execute_sql(&mut self, sql: &str) -> Result<QueryResult>;
}

impl SqlExecutor for InMemoryDB {
    fn execute_sql(&mut self, sql: &str) -> Result<QueryResult> {
        self.execute(sql)
    }
}

impl<E: SqlExecutor + ?Sized> SqlExecutor for &mut E {
    fn execute_sql(&mut self, sql: &str) -> Result<QueryResult> {
        (**self).execute_sql(sql)
    }
}

/// Runs statements and maps their rows.
pub struct SqlTemplate<E> {
    executor: E,
    show_sql: bool,
}

impl<E: SqlExecutor> SqlTemplate<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            show_sql: false,
        }
    }

    pub fn with_show_sql(mut self, show_sql: bool) -> Self {
        self.show_sql = show_sql;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        if self.show_sql {
            tracing::info!(target: "memorm::sql", "{}", sql);
        } else {
            tracing::debug!(target: "memorm::sql", "{}", sql);
        }
        self.executor.execute_sql(sql)
    }

    /// Runs a query that must return exactly one row.
    pub fn query_for_object<T, F>(&mut self, sql: &str, mapper: F) -> Result<T>
    where
        F: FnOnce(&ResultRow<'_>) -> Result<T>,
    {
        let result = self.execute(sql)?;
        match result.rows.as_slice() {
            [row] => mapper(&ResultRow::new(&result.columns, row)),
            [] => Err(OrmError::EmptyResult),
            rows => Err(OrmError::IncorrectResultSize(rows.len())),
        }
    }

    pub fn query<T, F>(&mut self, sql: &str, mut mapper: F) -> Result<Vec<T>>
    where
        F: FnMut(&ResultRow<'_>) -> Result<T>,
    {
        let result = self.execute(sql)?;
        result
            .rows
            .iter()
            .map(|row| mapper(&ResultRow::new(&result.columns, row)))
            .collect()
    }
}
