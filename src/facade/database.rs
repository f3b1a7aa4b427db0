use crate::core::{OrmError, Result};
use crate::executor::{ExecutionContext, ExecutorPipeline};
use crate::parser::SqlParserAdapter;
use crate::result::QueryResult;
use crate::storage::InMemoryStorage;

/// Single-connection in-memory SQL database.
///
/// Every SQL string handed to [`InMemoryDB::execute`] is recorded in a
/// statement log, which callers use to observe exactly which statements an
/// operation issued.
pub struct InMemoryDB {
    parser: SqlParserAdapter,
    storage: InMemoryStorage,
    executor_pipeline: ExecutorPipeline,
    statement_log: Vec<String>,
}

impl InMemoryDB {
    pub fn new() -> Self {
        Self {
            parser: SqlParserAdapter::new(),
            storage: InMemoryStorage::new(),
            executor_pipeline: ExecutorPipeline::with_default_executors(),
            statement_log: Vec::new(),
        }
    }

    /// Parses and runs `sql`. A string holding several statements runs them in
    /// order and returns the result of the last one.
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        self.statement_log.push(sql.to_string());

        let statements = self.parser.parse(sql)?;
        if statements.is_empty() {
            return Err(OrmError::ParseError("No statement found".into()));
        }

        let mut ctx = ExecutionContext::new(&mut self.storage);
        let mut last = QueryResult::empty();
        for stmt in &statements {
            last = self.executor_pipeline.execute(stmt, &mut ctx)?;
        }
        Ok(last)
    }

    /// Every SQL string passed to `execute`, oldest first, including failed ones.
    pub fn executed_statements(&self) -> &[String] {
        &self.statement_log
    }

    pub fn clear_statement_log(&mut self) {
        self.statement_log.clear();
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.storage.table_exists(name)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.storage.list_tables()
    }

    pub fn row_count(&self, table_name: &str) -> Result<usize> {
        self.storage.row_count(table_name)
    }
}

impl Default for InMemoryDB {
    fn default() -> Self {
        Self::new()
    }
}
