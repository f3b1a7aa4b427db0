use super::{ExecutionContext, Executor};
use crate::core::{Column, OrmError, Result};
use crate::parser::ast::{CreateTableStmt, DropTableStmt, Statement};
use crate::result::QueryResult;
use crate::storage::TableSchema;

pub struct CreateTableExecutor;

impl Executor for CreateTableExecutor {
    fn name(&self) -> &'static str {
        "CREATE_TABLE"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::CreateTable(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let Statement::CreateTable(create) = stmt else {
            return Err(OrmError::ExecutionError("CREATE_TABLE received wrong statement".into()));
        };

        self.execute_create_table(create, ctx)
    }
}

impl CreateTableExecutor {
    fn execute_create_table(&self, create: &CreateTableStmt, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        if ctx.storage.table_exists(&create.table_name) {
            if create.if_not_exists {
                return Ok(QueryResult::empty());
            }
            return Err(OrmError::TableExists(create.table_name.clone()));
        }

        let mut columns = Vec::with_capacity(create.columns.len());
        for def in &create.columns {
            if columns.iter().any(|c: &Column| c.name == def.name) {
                return Err(OrmError::ExecutionError(format!(
                    "Duplicate column '{}' in table '{}'",
                    def.name, create.table_name
                )));
            }

            let mut column = Column::new(def.name.clone(), def.data_type.clone());
            if !def.nullable {
                column = column.not_null();
            }
            if def.primary_key {
                column = column.primary_key();
            }
            if def.auto_increment {
                column = column.auto_increment();
            }
            columns.push(column);
        }

        ctx.storage
            .create_table(TableSchema::new(create.table_name.clone(), columns))?;
        tracing::debug!(table = %create.table_name, "table created");

        Ok(QueryResult::empty())
    }
}

pub struct DropTableExecutor;

impl Executor for DropTableExecutor {
    fn name(&self) -> &'static str {
        "DROP_TABLE"
    }

    fn can_handle(&self, stmt: &Statement) -> bool {
        matches!(stmt, Statement::DropTable(_))
    }

    fn execute(&self, stmt: &Statement, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        let Statement::DropTable(drop) = stmt else {
            return Err(OrmError::ExecutionError("DROP_TABLE received wrong statement".into()));
        };

        self.execute_drop_table(drop, ctx)
    }
}

impl DropTableExecutor {
    fn execute_drop_table(&self, drop: &DropTableStmt, ctx: &mut ExecutionContext<'_>) -> Result<QueryResult> {
        if !ctx.storage.table_exists(&drop.table_name) && drop.if_exists {
            return Ok(QueryResult::empty());
        }

        ctx.storage.drop_table(&drop.table_name)?;
        tracing::debug!(table = %drop.table_name, "table dropped");

        Ok(QueryResult::empty())
    }
}
