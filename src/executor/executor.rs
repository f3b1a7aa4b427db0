use super::ExecutionContext;
use crate::core::{OrmError, Result};
use crate::parser::ast::Statement;
use crate::result::QueryResult;

pub trait Executor {
    /// Executor name for tracing.
    fn name(&self) -> &'static str;

    fn can_handle(&self, stmt: &Statement) -> bool;
    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult>;
}

/// Dispatches a statement to the first registered executor that accepts it.
pub struct ExecutorPipeline {
    executors: Vec<Box<dyn Executor>>,
}

impl ExecutorPipeline {
    pub fn new() -> Self {
        Self {
            executors: Vec::new(),
        }
    }

    /// Pipeline with one executor per supported statement kind.
    pub fn with_default_executors() -> Self {
        let mut pipeline = Self::new();
        pipeline.register(Box::new(super::ddl::CreateTableExecutor));
        pipeline.register(Box::new(super::ddl::DropTableExecutor));
        pipeline.register(Box::new(super::dml::InsertExecutor::new()));
        pipeline.register(Box::new(super::query::QueryExecutor::new()));
        pipeline.register(Box::new(super::update::UpdateExecutor::new()));
        pipeline.register(Box::new(super::delete::DeleteExecutor::new()));
        pipeline
    }

    pub fn register(&mut self, executor: Box<dyn Executor>) {
        self.executors.push(executor);
    }

    pub fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        for executor in &self.executors {
            if executor.can_handle(stmt) {
                tracing::trace!(executor = executor.name(), "dispatching {}", stmt.kind());
                return executor.execute(stmt, ctx);
            }
        }

        Err(OrmError::UnsupportedOperation(format!(
            "No executor found for {} statement",
            stmt.kind()
        )))
    }
}

impl Default for ExecutorPipeline {
    fn default() -> Self {
        Self::with_default_executors()
    }
}
