use serde_json::Value;

use crate::error::{Error, Result};

/// A scalar value in a driver-agnostic form.
/// Values are rendered into statements as literals by [`SqlValue::to_literal`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int64(i64),
    Bool(bool),
}

impl SqlValue {
    /// Types a raw query parameter: integers in canonical form and
    /// `true`/`false` keep their native form, anything else is text.
    ///
    /// `"007"`, `"+5"` and `"-0"` stay text so the literal matches what the
    /// client sent.
    pub fn infer(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            if i.to_string() == raw {
                return SqlValue::Int64(i);
            }
        }
        match raw {
            "true" => SqlValue::Bool(true),
            "false" => SqlValue::Bool(false),
            _ => SqlValue::Text(raw.to_string()),
        }
    }

    /// Converts a JSON scalar. Floats, arrays and objects are rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(*b)),
            Value::String(s) => Ok(SqlValue::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(SqlValue::Int64).ok_or_else(|| {
                Error::InvalidPayload(format!("unsupported numeric value {}", n))
            }),
            other => Err(Error::InvalidPayload(format!(
                "unsupported value {}, expected a string, integer or boolean",
                other
            ))),
        }
    }

    /// Renders the value as a statement literal. Text is single-quoted with
    /// embedded quotes doubled, which is only an escape when backslashes are
    /// literal; the PostgreSQL adapter refuses servers where they are not.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlValue::Int64(i) => i.to_string(),
            SqlValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int64(i64::from(value))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int64(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer() {
        assert_eq!(SqlValue::infer("10"), SqlValue::Int64(10));
        assert_eq!(SqlValue::infer("-3"), SqlValue::Int64(-3));
        assert_eq!(SqlValue::infer("true"), SqlValue::Bool(true));
        assert_eq!(SqlValue::infer("M"), SqlValue::Text("M".to_string()));
        assert_eq!(SqlValue::infer("1.5"), SqlValue::Text("1.5".to_string()));
    }

    #[test]
    fn test_infer_keeps_non_canonical_integers_as_text() {
        assert_eq!(SqlValue::infer("007"), SqlValue::Text("007".to_string()));
        assert_eq!(SqlValue::infer("+5"), SqlValue::Text("+5".to_string()));
        assert_eq!(SqlValue::infer("-0"), SqlValue::Text("-0".to_string()));
        assert_eq!(SqlValue::infer("0"), SqlValue::Int64(0));
        assert_eq!(SqlValue::infer("007").to_literal(), "'007'");
    }

    #[test]
    fn test_literal_escapes_quotes() {
        assert_eq!(SqlValue::from("t-shirt").to_literal(), "'t-shirt'");
        assert_eq!(SqlValue::from("it's").to_literal(), "'it''s'");
        assert_eq!(
            SqlValue::from("x'; DROP TABLE shirts; --").to_literal(),
            "'x''; DROP TABLE shirts; --'"
        );
        assert_eq!(SqlValue::from(10).to_literal(), "10");
        assert_eq!(SqlValue::from(false).to_literal(), "false");
        assert_eq!(SqlValue::from(None::<i64>).to_literal(), "NULL");
    }

    #[test]
    fn test_from_json_rejects_non_scalars() {
        assert_eq!(SqlValue::from_json(&json!(7)).unwrap(), SqlValue::Int64(7));
        assert_eq!(SqlValue::from_json(&json!(null)).unwrap(), SqlValue::Null);
        assert!(SqlValue::from_json(&json!(1.25)).is_err());
        assert!(SqlValue::from_json(&json!([1, 2])).is_err());
        assert!(SqlValue::from_json(&json!({"a": 1})).is_err());
    }
}
