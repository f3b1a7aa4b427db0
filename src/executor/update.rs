use super::{ExecutionContext, Executor, ExpressionEvaluator};
use crate::core::{OrmError, Result};
use crate::parser::ast::{Statement, UpdateStmt};
use crate::result::QueryResult;

pub struct UpdateExecutor {
    evaluator: ExpressionEvaluator,
}

impl UpdateExecutor {
    pub fn new() -> Self {
        Self {
            evaluator: ExpressionEvaluator::new(),
        }
    }
}

impl Default for UpdateExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for UpdateExecutor {
    fn name(&self) -> &'static str {
        "UPDATE"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::Update(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let Statement::Update(update) = stmt else {
            return Err(OrmError::ExecutionError("UPDATE received wrong statement".into()));
        };

        self.execute_update(update, ctx)
    }
}

impl UpdateExecutor {
    fn execute_update(&self, update: &UpdateStmt, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let table = ctx.storage.get_table_mut(&update.table_name)?;
        let schema = table.schema().schema().clone();

        let targets = update
            .assignments
            .iter()
            .map(|assignment| {
                schema
                    .find_column_index(&assignment.column)
                    .map(|idx| (idx, &assignment.value))
                    .ok_or_else(|| {
                        OrmError::ColumnNotFound(assignment.column.clone(), update.table_name.clone())
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        // Every new row is computed first and the table applies them as one batch.
        let mut updates = Vec::new();
        for (id, row) in table.scan_with_ids() {
            if !self
                .evaluator
                .matches(update.selection.as_ref(), &row, &schema, &update.table_name)?
            {
                continue;
            }

            let mut new_row = row.clone();
            for (idx, expr) in &targets {
                let value = self.evaluator.evaluate(expr, &row, &schema, &update.table_name)?;
                new_row[*idx] = schema.columns()[*idx].data_type.cast_value(&value)?;
            }
            updates.push((id, new_row));
        }

        let updated = table.update_all(updates)?;

        tracing::trace!(table = %update.table_name, updated, "rows updated");
        Ok(QueryResult::affected(updated))
    }
}
