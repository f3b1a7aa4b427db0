use crate::core::{OrmError, Result, Value};
use crate::metadata::SqlType;

/// Conversion between a Rust field type and a column value.
///
/// Implemented for the field types `#[derive(Entity)]` accepts.
pub trait ColumnValue: Sized {
    fn sql_type() -> SqlType;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T> {
    Err(OrmError::MappingError(format!(
        "expected {}, got {} ({})",
        expected,
        value.type_name(),
        value
    )))
}

impl ColumnValue for i64 {
    fn sql_type() -> SqlType {
        SqlType::BigInt
    }

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value.as_i64() {
            Some(i) => Ok(i),
            None => mismatch("BIGINT", value),
        }
    }
}

impl ColumnValue for i32 {
    fn sql_type() -> SqlType {
        SqlType::Integer
    }

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value.as_i64().map(i32::try_from) {
            Some(Ok(i)) => Ok(i),
            Some(Err(_)) => Err(OrmError::MappingError(format!("{} does not fit in INTEGER", value))),
            None => mismatch("INTEGER", value),
        }
    }
}

impl ColumnValue for String {
    fn sql_type() -> SqlType {
        SqlType::Varchar
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => mismatch("VARCHAR", other),
        }
    }
}

impl ColumnValue for bool {
    fn sql_type() -> SqlType {
        SqlType::Boolean
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value.as_bool() {
            Some(b) => Ok(b),
            None => mismatch("BOOLEAN", value),
        }
    }
}

impl ColumnValue for f64 {
    fn sql_type() -> SqlType {
        SqlType::Double
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Result<Self> {
        match value.as_f64() {
            Some(f) => Ok(f),
            None => mismatch("DOUBLE", value),
        }
    }
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    fn sql_type() -> SqlType {
        T::sql_type()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
