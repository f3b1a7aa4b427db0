use super::{ExecutionContext, Executor, ExpressionEvaluator};
use crate::core::{OrmError, Result, Row, Schema, Value};
use crate::parser::ast::{Expr, InsertStmt, Statement};
use crate::result::QueryResult;

pub struct InsertExecutor {
    evaluator: ExpressionEvaluator,
}

impl InsertExecutor {
    pub fn new() -> Self {
        Self {
            evaluator: ExpressionEvaluator::new(),
        }
    }
}

impl Default for InsertExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for InsertExecutor {
    fn name(&self) -> &'static str {
        "INSERT"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::Insert(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let Statement::Insert(insert) = stmt else {
            return Err(OrmError::ExecutionError("INSERT received wrong statement".into()));
        };

        self.execute_insert(insert, ctx)
    }
}

impl InsertExecutor {
    fn execute_insert(&self, insert: &InsertStmt, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let table = ctx.storage.get_table_mut(&insert.table_name)?;
        let schema = table.schema().schema().clone();

        // Malformed VALUES lists fail before any row is stored.
        let mut rows = Vec::with_capacity(insert.values.len());
        for value_exprs in &insert.values {
            rows.push(self.build_row(insert, value_exprs, &schema)?);
        }

        let inserted = rows.len();
        let generated_key = table.insert_all(rows)?;

        tracing::trace!(table = %insert.table_name, inserted, "rows inserted");
        Ok(QueryResult::affected(inserted).with_generated_key(generated_key))
    }

    fn build_row(&self, insert: &InsertStmt, value_exprs: &[Expr], schema: &Schema) -> Result<Row> {
        let empty_row: Row = Vec::new();
        let mut row: Row = vec![Value::Null; schema.column_count()];

        match &insert.columns {
            Some(columns) => {
                if columns.len() != value_exprs.len() {
                    return Err(OrmError::ExecutionError(format!(
                        "INSERT lists {} columns but {} values",
                        columns.len(),
                        value_exprs.len()
                    )));
                }
                for (name, expr) in columns.iter().zip(value_exprs) {
                    let idx = schema
                        .find_column_index(name)
                        .ok_or_else(|| OrmError::ColumnNotFound(name.clone(), insert.table_name.clone()))?;
                    let value = self.evaluator.evaluate(expr, &empty_row, schema, &insert.table_name)?;
                    row[idx] = schema.columns()[idx].data_type.cast_value(&value)?;
                }
            }
            None => {
                if value_exprs.len() != schema.column_count() {
                    return Err(OrmError::ExecutionError(format!(
                        "Table '{}' has {} columns but {} values were supplied",
                        insert.table_name,
                        schema.column_count(),
                        value_exprs.len()
                    )));
                }
                for (idx, expr) in value_exprs.iter().enumerate() {
                    let value = self.evaluator.evaluate(expr, &empty_row, schema, &insert.table_name)?;
                    row[idx] = schema.columns()[idx].data_type.cast_value(&value)?;
                }
            }
        }

        Ok(row)
    }
}
