use crate::core::{OrmError, Result, Row, Schema, Value};
use crate::parser::ast::{BinaryOp, Expr};

/// Evaluates WHERE predicates and SET expressions against a single row.
///
/// Comparisons follow SQL three-valued logic: anything compared with NULL
/// yields NULL, and a NULL predicate does not select the row.
#[derive(Debug, Default)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, expr: &Expr, row: &Row, schema: &Schema, table: &str) -> Result<Value> {
        match expr {
            Expr::Column(name) => {
                let idx = schema
                    .find_column_index(name)
                    .ok_or_else(|| OrmError::ColumnNotFound(name.clone(), table.to_string()))?;
                row.get(idx).cloned().ok_or_else(|| {
                    OrmError::ExecutionError(format!("Column '{}' cannot be referenced here", name))
                })
            }
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Not(inner) => match self.evaluate(inner, row, schema, table)? {
                Value::Null => Ok(Value::Null),
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                other => Err(OrmError::TypeMismatch(format!(
                    "NOT expects BOOLEAN, got {}",
                    other.type_name()
                ))),
            },
            Expr::Negate(inner) => match self.evaluate(inner, row, schema, table)? {
                Value::Null => Ok(Value::Null),
                Value::Integer(i) => Ok(Value::Integer(-i)),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(OrmError::TypeMismatch(format!(
                    "Cannot negate {}",
                    other.type_name()
                ))),
            },
            Expr::IsNull { expr, negated } => {
                let is_null = self.evaluate(expr, row, schema, table)?.is_null();
                Ok(Value::Boolean(is_null != *negated))
            }
            Expr::BinaryOp { left, op, right } => {
                let left = self.evaluate(left, row, schema, table)?;
                let right = self.evaluate(right, row, schema, table)?;
                self.apply(*op, &left, &right)
            }
        }
    }

    /// True when the predicate evaluates to TRUE for the row.
    pub fn matches(&self, predicate: Option<&Expr>, row: &Row, schema: &Schema, table: &str) -> Result<bool> {
        let Some(predicate) = predicate else {
            return Ok(true);
        };
        match self.evaluate(predicate, row, schema, table)? {
            Value::Boolean(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(OrmError::TypeMismatch(format!(
                "WHERE clause must be BOOLEAN, got {}",
                other.type_name()
            ))),
        }
    }

    fn apply(&self, op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
        match op {
            BinaryOp::And => match (left, right) {
                (Value::Boolean(false), _) | (_, Value::Boolean(false)) => Ok(Value::Boolean(false)),
                (Value::Boolean(true), Value::Boolean(true)) => Ok(Value::Boolean(true)),
                (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
                _ => Err(self.logical_mismatch(op, left, right)),
            },
            BinaryOp::Or => match (left, right) {
                (Value::Boolean(true), _) | (_, Value::Boolean(true)) => Ok(Value::Boolean(true)),
                (Value::Boolean(false), Value::Boolean(false)) => Ok(Value::Boolean(false)),
                (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
                _ => Err(self.logical_mismatch(op, left, right)),
            },
            _ => {
                if left.is_null() || right.is_null() {
                    return Ok(Value::Null);
                }
                let ordering = left.compare(right)?;
                let result = match op {
                    BinaryOp::Eq => ordering.is_eq(),
                    BinaryOp::NotEq => ordering.is_ne(),
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::LtEq => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    BinaryOp::GtEq => ordering.is_ge(),
                    BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
                };
                Ok(Value::Boolean(result))
            }
        }
    }

    fn logical_mismatch(&self, op: BinaryOp, left: &Value, right: &Value) -> OrmError {
        OrmError::TypeMismatch(format!(
            "{} expects BOOLEAN operands, got {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("id", DataType::Integer),
            Column::new("email", DataType::Text),
        ])
    }

    fn eq(column: &str, value: Value) -> Expr {
        Expr::BinaryOp {
            left: Box::new(Expr::Column(column.into())),
            op: BinaryOp::Eq,
            right: Box::new(Expr::Literal(value)),
        }
    }

    #[test]
    fn test_equality_predicate() {
        let evaluator = ExpressionEvaluator::new();
        let row = vec![Value::Integer(1), Value::from("a@b.c")];

        assert!(evaluator.matches(Some(&eq("id", Value::Integer(1))), &row, &schema(), "users").unwrap());
        assert!(!evaluator.matches(Some(&eq("id", Value::Integer(2))), &row, &schema(), "users").unwrap());
    }

    #[test]
    fn test_null_comparison_does_not_match() {
        let evaluator = ExpressionEvaluator::new();
        let row = vec![Value::Integer(1), Value::Null];

        assert!(!evaluator.matches(Some(&eq("email", Value::from("x"))), &row, &schema(), "users").unwrap());

        let is_null = Expr::IsNull {
            expr: Box::new(Expr::Column("email".into())),
            negated: false,
        };
        assert!(evaluator.matches(Some(&is_null), &row, &schema(), "users").unwrap());
    }

    #[test]
    fn test_unknown_column() {
        let evaluator = ExpressionEvaluator::new();
        let row = vec![Value::Integer(1), Value::Null];

        let err = evaluator
            .matches(Some(&eq("missing", Value::Integer(1))), &row, &schema(), "users")
            .unwrap_err();
        assert!(matches!(err, OrmError::ColumnNotFound(col, table) if col == "missing" && table == "users"));
    }

    #[test]
    fn test_and_short_circuits_null() {
        let evaluator = ExpressionEvaluator::new();
        let falsy = evaluator
            .apply(BinaryOp::And, &Value::Null, &Value::Boolean(false))
            .unwrap();
        assert_eq!(falsy, Value::Boolean(false));

        let unknown = evaluator
            .apply(BinaryOp::Or, &Value::Null, &Value::Boolean(false))
            .unwrap();
        assert!(unknown.is_null());
    }
}
