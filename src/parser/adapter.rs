use sqlparser::ast as sql_ast;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::core::{DataType, OrmError, Result};
use crate::parser::ast::*;
use crate::parser::expression::ExpressionConverter;

/// Translates SQL text into the engine's statement tree.
///
/// `GenericDialect` is used because it accepts both MySQL/H2 style
/// `AUTO_INCREMENT` and standard `GENERATED ... AS IDENTITY` columns.
pub struct SqlParserAdapter {
    dialect: GenericDialect,
    expr_converter: ExpressionConverter,
}

impl SqlParserAdapter {
    pub fn new() -> Self {
        Self {
            dialect: GenericDialect {},
            expr_converter: ExpressionConverter::new(),
        }
    }

    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>> {
        let external_stmts = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| OrmError::ParseError(e.to_string()))?;

        external_stmts
            .into_iter()
            .map(|stmt| self.convert_statement(stmt))
            .collect()
    }

    fn convert_statement(&self, stmt: sql_ast::Statement) -> Result<Statement> {
        match stmt {
            sql_ast::Statement::CreateTable(create) => {
                Ok(Statement::CreateTable(self.convert_create_table(create)?))
            }
            sql_ast::Statement::Drop { object_type, names, if_exists, .. } => {
                if let sql_ast::ObjectType::Table = object_type {
                    Ok(Statement::DropTable(self.convert_drop_table(names, if_exists)?))
                } else {
                    Err(OrmError::UnsupportedOperation(format!(
                        "Only DROP TABLE supported, got: {:?}",
                        object_type
                    )))
                }
            }
            sql_ast::Statement::Insert(insert) => Ok(Statement::Insert(self.convert_insert(insert)?)),
            sql_ast::Statement::Query(query) => Ok(Statement::Query(self.convert_query(*query)?)),
            sql_ast::Statement::Delete(delete) => Ok(Statement::Delete(self.convert_delete(delete)?)),
            sql_ast::Statement::Update { table, assignments, selection, .. } => {
                Ok(Statement::Update(self.convert_update(table, assignments, selection)?))
            }
            other => Err(OrmError::UnsupportedOperation(format!(
                "Statement type not supported: {}",
                other
            ))),
        }
    }

    fn convert_create_table(&self, create: sql_ast::CreateTable) -> Result<CreateTableStmt> {
        let table_name = extract_table_name(&create.name)?;
        let table_primary_key = table_level_primary_key(&create.constraints);

        let mut columns = create
            .columns
            .into_iter()
            .map(|col| self.convert_column_def(col))
            .collect::<Result<Vec<_>>>()?;

        for column in &mut columns {
            if table_primary_key.iter().any(|name| name == &column.name) {
                column.primary_key = true;
                column.nullable = false;
            }
        }

        Ok(CreateTableStmt {
            table_name,
            columns,
            if_not_exists: create.if_not_exists,
        })
    }

    fn convert_column_def(&self, col: sql_ast::ColumnDef) -> Result<ColumnDef> {
        let data_type = self.convert_data_type(&col.data_type)?;

        let mut nullable = true;
        let mut primary_key = false;
        let mut auto_increment = false;
        for opt in &col.options {
            if matches!(opt.option, sql_ast::ColumnOption::NotNull) {
                nullable = false;
                continue;
            }
            // Match on the rendered option: variant shapes for keys and identity
            // columns differ between sqlparser releases, their SQL text does not.
            let rendered = opt.option.to_string().to_ascii_uppercase();
            if rendered.starts_with("PRIMARY KEY") {
                primary_key = true;
                nullable = false;
            }
            if rendered.contains("AUTO_INCREMENT") || rendered.contains("AS IDENTITY") {
                auto_increment = true;
            }
        }

        Ok(ColumnDef {
            name: col.name.value,
            data_type,
            nullable,
            primary_key,
            auto_increment,
        })
    }

    fn convert_data_type(&self, dt: &sql_ast::DataType) -> Result<DataType> {
        match dt {
            sql_ast::DataType::Int(_)
            | sql_ast::DataType::Integer(_)
            | sql_ast::DataType::BigInt(_)
            | sql_ast::DataType::SmallInt(_) => Ok(DataType::Integer),

            sql_ast::DataType::Float(_)
            | sql_ast::DataType::Double(_)
            | sql_ast::DataType::DoublePrecision
            | sql_ast::DataType::Real => Ok(DataType::Float),

            sql_ast::DataType::Text
            | sql_ast::DataType::Varchar(_)
            | sql_ast::DataType::Char(_)
            | sql_ast::DataType::String(_) => Ok(DataType::Text),

            sql_ast::DataType::Boolean | sql_ast::DataType::Bool => Ok(DataType::Boolean),

            _ => Err(OrmError::TypeMismatch(format!("Unsupported data type: {}", dt))),
        }
    }

    fn convert_drop_table(&self, names: Vec<sql_ast::ObjectName>, if_exists: bool) -> Result<DropTableStmt> {
        if names.len() != 1 {
            return Err(OrmError::UnsupportedOperation(
                "Only single table DROP supported".into(),
            ));
        }

        let table_name = extract_table_name(&names[0])?;

        Ok(DropTableStmt {
            table_name,
            if_exists,
        })
    }

    fn convert_insert(&self, insert: sql_ast::Insert) -> Result<InsertStmt> {
        let table_name = insert.table.to_string();

        let columns = if insert.columns.is_empty() {
            None
        } else {
            Some(insert.columns.into_iter().map(|id| id.value).collect())
        };

        let values = if let Some(source) = insert.source {
            if let sql_ast::SetExpr::Values(vals) = *source.body {
                vals.rows
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|expr| self.expr_converter.convert(expr))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                return Err(OrmError::UnsupportedOperation(
                    "Only VALUES clause supported".into(),
                ));
            }
        } else {
            Vec::new()
        };

        Ok(InsertStmt {
            table_name,
            columns,
            values,
        })
    }

    fn convert_query(&self, query: sql_ast::Query) -> Result<QueryStmt> {
        let sql_ast::SetExpr::Select(select) = *query.body else {
            return Err(OrmError::UnsupportedOperation(
                "Only SELECT queries supported".into(),
            ));
        };
        let select = *select;

        if select.from.len() != 1 {
            return Err(OrmError::UnsupportedOperation(
                "SELECT must read from exactly one table".into(),
            ));
        }
        let Some(from) = select.from.into_iter().next() else {
            return Err(OrmError::ParseError("SELECT requires FROM clause".into()));
        };
        if !from.joins.is_empty() {
            return Err(OrmError::UnsupportedOperation("Joins are not supported".into()));
        }
        let table_name = table_factor_name(&from.relation)?;

        let projection = select
            .projection
            .into_iter()
            .map(|item| self.convert_select_item(item))
            .collect::<Result<Vec<_>>>()?;

        let selection = select
            .selection
            .map(|expr| self.expr_converter.convert(expr))
            .transpose()?;

        Ok(QueryStmt {
            projection,
            table_name,
            selection,
        })
    }

    fn convert_select_item(&self, item: sql_ast::SelectItem) -> Result<SelectItem> {
        match item {
            sql_ast::SelectItem::Wildcard(_) => Ok(SelectItem::Wildcard),
            sql_ast::SelectItem::UnnamedExpr(expr) => match self.expr_converter.convert(expr)? {
                Expr::Column(name) => Ok(SelectItem::Column(name)),
                other => Err(OrmError::UnsupportedOperation(format!(
                    "Only column references can be selected, got {:?}",
                    other
                ))),
            },
            _ => Err(OrmError::UnsupportedOperation(
                "Unsupported select item".into(),
            )),
        }
    }

    fn convert_delete(&self, delete: sql_ast::Delete) -> Result<DeleteStmt> {
        let tables = match delete.from {
            sql_ast::FromTable::WithFromKeyword(tables) => tables,
            sql_ast::FromTable::WithoutKeyword(tables) => tables,
        };
        let Some(table) = tables.first() else {
            return Err(OrmError::ParseError("DELETE requires a table name".into()));
        };
        let table_name = table_factor_name(&table.relation)?;

        let selection = delete
            .selection
            .map(|expr| self.expr_converter.convert(expr))
            .transpose()?;

        Ok(DeleteStmt {
            table_name,
            selection,
        })
    }

    fn convert_update(
        &self,
        table: sql_ast::TableWithJoins,
        assignments: Vec<sql_ast::Assignment>,
        selection: Option<sql_ast::Expr>,
    ) -> Result<UpdateStmt> {
        let table_name = table_factor_name(&table.relation)?;

        let assignments = assignments
            .into_iter()
            .map(|assign| {
                let column = match assign.target {
                    sql_ast::AssignmentTarget::ColumnName(col_name) => {
                        if col_name.0.len() == 1 {
                            col_name.0[0].to_string()
                        } else {
                            return Err(OrmError::UnsupportedOperation(
                                "Qualified column names not supported in UPDATE".into(),
                            ));
                        }
                    }
                    _ => {
                        return Err(OrmError::UnsupportedOperation(
                            "Only simple column names supported in UPDATE".into(),
                        ));
                    }
                };

                let value = self.expr_converter.convert(assign.value)?;

                Ok(Assignment { column, value })
            })
            .collect::<Result<Vec<_>>>()?;

        let selection = selection
            .map(|expr| self.expr_converter.convert(expr))
            .transpose()?;

        Ok(UpdateStmt {
            table_name,
            assignments,
            selection,
        })
    }
}

impl Default for SqlParserAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_table_name(name: &sql_ast::ObjectName) -> Result<String> {
    name.0
        .last()
        .map(|ident| ident.to_string())
        .ok_or_else(|| OrmError::ParseError("Invalid table name".into()))
}

fn table_factor_name(factor: &sql_ast::TableFactor) -> Result<String> {
    match factor {
        sql_ast::TableFactor::Table { name, .. } => extract_table_name(name),
        _ => Err(OrmError::UnsupportedOperation(
            "Complex table references not supported".into(),
        )),
    }
}

/// Column names of a `PRIMARY KEY (a, b)` table constraint, if present.
fn table_level_primary_key(constraints: &[sql_ast::TableConstraint]) -> Vec<String> {
    constraints
        .iter()
        .map(|constraint| constraint.to_string())
        .filter(|rendered| rendered.to_ascii_uppercase().contains("PRIMARY KEY"))
        .filter_map(|rendered| {
            let open = rendered.find('(')?;
            let close = rendered[open..].find(')')? + open;
            Some(
                rendered[open + 1..close]
                    .split(',')
                    .map(|name| name.trim().trim_matches('"').to_string())
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>(),
            )
        })
        .flatten()
        .collect()
}
