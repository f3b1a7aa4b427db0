use super::{ExecutionContext, Executor, ExpressionEvaluator};
use crate::core::{OrmError, Result};
use crate::parser::ast::{DeleteStmt, Statement};
use crate::result::QueryResult;

pub struct DeleteExecutor {
    evaluator: ExpressionEvaluator,
}

impl DeleteExecutor {
    pub fn new() -> Self {
        Self {
            evaluator: ExpressionEvaluator::new(),
        }
    }
}

impl Default for DeleteExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for DeleteExecutor {
    fn name(&self) -> &'static str {
        "DELETE"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::Delete(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let Statement::Delete(delete) = stmt else {
            return Err(OrmError::ExecutionError("DELETE received wrong statement".into()));
        };

        self.execute_delete(delete, ctx)
    }
}

impl DeleteExecutor {
    fn execute_delete(&self, delete: &DeleteStmt, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let table = ctx.storage.get_table_mut(&delete.table_name)?;
        let schema = table.schema().schema().clone();

        let mut doomed = Vec::new();
        for (id, row) in table.scan_with_ids() {
            if self
                .evaluator
                .matches(delete.selection.as_ref(), &row, &schema, &delete.table_name)?
            {
                doomed.push(id);
            }
        }

        let deleted = doomed.into_iter().filter(|id| table.delete(*id)).count();

        tracing::trace!(table = %delete.table_name, deleted, "rows deleted");
        Ok(QueryResult::affected(deleted))
    }
}
