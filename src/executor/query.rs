use super::{ExecutionContext, Executor, ExpressionEvaluator};
use crate::core::{OrmError, Result, Row};
use crate::parser::ast::{QueryStmt, SelectItem, Statement};
use crate::result::QueryResult;

/// Single-table SELECT: scan, filter, then project.
pub struct QueryExecutor {
    evaluator: ExpressionEvaluator,
}

impl QueryExecutor {
    pub fn new() -> Self {
        Self {
            evaluator: ExpressionEvaluator::new(),
        }
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for QueryExecutor {
    fn name(&self) -> &'static str {
        "QUERY"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::Query(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let Statement::Query(query) = stmt else {
            return Err(OrmError::ExecutionError("QUERY received wrong statement".into()));
        };

        self.execute_query(query, ctx)
    }
}

impl QueryExecutor {
    fn execute_query(&self, query: &QueryStmt, ctx: &ExecutionContext<'_>) -> Result<QueryResult> {
        let table = ctx.storage.get_table(&query.table_name)?;
        let schema = table.schema().schema();

        let (columns, indices) = self.resolve_projection(query, table.schema().column_names(), schema)?;

        let mut rows: Vec<Row> = Vec::new();
        for row in table.scan() {
            if self
                .evaluator
                .matches(query.selection.as_ref(), &row, schema, &query.table_name)?
            {
                rows.push(indices.iter().map(|idx| row[*idx].clone()).collect());
            }
        }

        Ok(QueryResult::new(columns, rows))
    }

    fn resolve_projection(
        &self,
        query: &QueryStmt,
        all_columns: Vec<String>,
        schema: &crate::core::Schema,
    ) -> Result<(Vec<String>, Vec<usize>)> {
        let mut names = Vec::new();
        let mut indices = Vec::new();

        for item in &query.projection {
            match item {
                SelectItem::Wildcard => {
                    indices.extend(0..all_columns.len());
                    names.extend(all_columns.iter().cloned());
                }
                SelectItem::Column(name) => {
                    let idx = schema.find_column_index(name).ok_or_else(|| {
                        OrmError::ColumnNotFound(name.clone(), query.table_name.clone())
                    })?;
                    indices.push(idx);
                    names.push(name.clone());
                }
            }
        }

        Ok((names, indices))
    }
}
