use sqlparser::ast as sql_ast;

use crate::core::{OrmError, Result, Value};
use crate::parser::ast::{BinaryOp, Expr};

/// Converts `sqlparser` expressions into the engine's expression tree.
///
/// Only the forms the statement builders emit (and a little more) are
/// supported: column references, literals, comparisons, boolean connectives,
/// `IS [NOT] NULL`, parentheses and unary minus.
#[derive(Debug, Default)]
pub struct ExpressionConverter;

impl ExpressionConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn convert(&self, expr: sql_ast::Expr) -> Result<Expr> {
        match expr {
            sql_ast::Expr::Identifier(ident) => Ok(Expr::Column(ident.value)),
            sql_ast::Expr::CompoundIdentifier(idents) => idents
                .into_iter()
                .last()
                .map(|ident| Expr::Column(ident.value))
                .ok_or_else(|| OrmError::ParseError("Empty compound identifier".into())),
            sql_ast::Expr::Value(val) => Ok(Expr::Literal(self.convert_value(&val.value)?)),
            sql_ast::Expr::Nested(inner) => self.convert(*inner),
            sql_ast::Expr::IsNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.convert(*inner)?),
                negated: false,
            }),
            sql_ast::Expr::IsNotNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.convert(*inner)?),
                negated: true,
            }),
            sql_ast::Expr::BinaryOp { left, op, right } => Ok(Expr::BinaryOp {
                left: Box::new(self.convert(*left)?),
                op: self.convert_binary_op(&op)?,
                right: Box::new(self.convert(*right)?),
            }),
            sql_ast::Expr::UnaryOp { op, expr } => match op {
                sql_ast::UnaryOperator::Not => Ok(Expr::Not(Box::new(self.convert(*expr)?))),
                sql_ast::UnaryOperator::Minus => self.convert_negation(*expr),
                sql_ast::UnaryOperator::Plus => self.convert(*expr),
                other => Err(OrmError::UnsupportedOperation(format!(
                    "Unsupported unary operator: {:?}",
                    other
                ))),
            },
            other => Err(OrmError::UnsupportedOperation(format!(
                "Unsupported expression: {}",
                other
            ))),
        }
    }

    pub fn convert_value(&self, val: &sql_ast::Value) -> Result<Value> {
        match val {
            sql_ast::Value::Number(n, _) => {
                if let Ok(i) = n.parse::<i64>() {
                    Ok(Value::Integer(i))
                } else if let Ok(f) = n.parse::<f64>() {
                    Ok(Value::Float(f))
                } else {
                    Err(OrmError::TypeMismatch(format!("Invalid number: {}", n)))
                }
            }
            sql_ast::Value::SingleQuotedString(s) | sql_ast::Value::DoubleQuotedString(s) => {
                Ok(Value::Text(s.clone()))
            }
            sql_ast::Value::Boolean(b) => Ok(Value::Boolean(*b)),
            sql_ast::Value::Null => Ok(Value::Null),
            _ => Err(OrmError::UnsupportedOperation(format!(
                "Unsupported value: {:?}",
                val
            ))),
        }
    }

    fn convert_negation(&self, expr: sql_ast::Expr) -> Result<Expr> {
        // fold "-<number>" into a literal so ids like -1 compare directly
        match self.convert(expr)? {
            Expr::Literal(Value::Integer(i)) => Ok(Expr::Literal(Value::Integer(-i))),
            Expr::Literal(Value::Float(f)) => Ok(Expr::Literal(Value::Float(-f))),
            other => Ok(Expr::Negate(Box::new(other))),
        }
    }

    fn convert_binary_op(&self, op: &sql_ast::BinaryOperator) -> Result<BinaryOp> {
        use sql_ast::BinaryOperator as SqlOp;

        match op {
            SqlOp::Eq => Ok(BinaryOp::Eq),
            SqlOp::NotEq => Ok(BinaryOp::NotEq),
            SqlOp::Lt => Ok(BinaryOp::Lt),
            SqlOp::LtEq => Ok(BinaryOp::LtEq),
            SqlOp::Gt => Ok(BinaryOp::Gt),
            SqlOp::GtEq => Ok(BinaryOp::GtEq),
            SqlOp::And => Ok(BinaryOp::And),
            SqlOp::Or => Ok(BinaryOp::Or),
            _ => Err(OrmError::UnsupportedOperation(format!(
                "Unsupported binary operator: {:?}",
                op
            ))),
        }
    }
}
