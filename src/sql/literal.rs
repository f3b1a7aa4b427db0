use crate::core::{OrmError, Result, Value};

/// Renders a value as an inline SQL literal. Infinite and NaN floats have no
/// literal form and are rejected.
pub fn to_sql_literal(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if !f.is_finite() => {
            return Err(OrmError::MappingError(format!(
                "{} has no SQL literal form",
                f
            )));
        }
        // Debug keeps a fractional part on whole floats ("2.0")
        Value::Float(f) => format!("{:?}", f),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Boolean(true) => "TRUE".to_string(),
        Value::Boolean(false) => "FALSE".to_string(),
    })
}
