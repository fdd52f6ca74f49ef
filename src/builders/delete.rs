use crate::error::{Error, Result};
use crate::types::{validate_identifier, Command, SqlValue};

/// Query parameter carrying the field name of a row delete.
pub const FIELD_NAME_PARAM: &str = "fName";
/// Query parameter carrying the field value of a row delete.
pub const FIELD_VALUE_PARAM: &str = "fValue";

/// Builds `DELETE FROM table WHERE field=value`.
///
/// Both parts are required; the value is typed the same way as select filters.
pub fn delete(table: &str, field_name: Option<&str>, field_value: Option<&str>) -> Result<Command> {
    let (field_name, field_value) = match (field_name, field_value) {
        (Some(name), Some(value)) if !name.is_empty() && !value.is_empty() => (name, value),
        _ => {
            return Err(Error::MissingParameter(format!(
                "must provide {} and {}, corresponding to the field name and value to use \
                 in the WHERE clause of the DELETE statement",
                FIELD_NAME_PARAM, FIELD_VALUE_PARAM
            )))
        }
    };
    let table = validate_identifier(table)?;
    let field_name = validate_identifier(field_name)?;

    Ok(Command::write(vec![format!(
        "DELETE FROM {} WHERE {}={}",
        table,
        field_name,
        SqlValue::infer(field_value).to_literal()
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_by_text_value() {
        let cmd = delete("shirts", Some("size"), Some("M")).unwrap();
        assert_eq!(cmd.text(), "DELETE FROM shirts WHERE size='M'");
        assert!(!cmd.is_read());
    }

    #[test]
    fn test_delete_by_number() {
        let cmd = delete("shirts", Some("price"), Some("10")).unwrap();
        assert_eq!(cmd.text(), "DELETE FROM shirts WHERE price=10");
    }

    #[test]
    fn test_missing_parameters() {
        for (name, value) in [
            (None, Some("M")),
            (Some("size"), None),
            (None, None),
            (Some(""), Some("M")),
        ] {
            match delete("shirts", name, value) {
                Err(Error::MissingParameter(msg)) => assert!(msg.contains("fName and fValue")),
                other => panic!("Expected MissingParameter, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_value_cannot_escape_predicate() {
        let cmd = delete("shirts", Some("size"), Some("M' OR 'a'='a")).unwrap();
        assert_eq!(
            cmd.text(),
            "DELETE FROM shirts WHERE size='M'' OR ''a''=''a'"
        );
    }
}
