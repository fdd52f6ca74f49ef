use crate::error::{Error, Result};
use crate::types::{validate_identifier, Command, FieldSchema, TypeMapping};

/// Builds `CREATE TABLE` for a validated schema, listing fields in schema order.
pub fn create_table(table: &str, schema: &FieldSchema, mapping: &TypeMapping) -> Result<Command> {
    let table = validate_identifier(table)?;

    let mut sql = String::with_capacity(64);
    sql.push_str("CREATE TABLE ");
    sql.push_str(table);
    sql.push_str(" (");
    for (i, (field, field_type)) in schema.fields().iter().enumerate() {
        let native = mapping.native(*field_type).ok_or_else(|| {
            Error::SchemaValidation(format!("type '{}' is not supported", field_type))
        })?;
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(validate_identifier(field)?);
        sql.push(' ');
        sql.push_str(native);
        if schema.key() == Some(field.as_str()) {
            sql.push_str(" PRIMARY KEY");
        }
    }
    sql.push(')');

    Ok(Command::write(vec![sql]))
}

/// Builds `DROP TABLE`.
pub fn drop_table(table: &str) -> Result<Command> {
    let table = validate_identifier(table)?;
    Ok(Command::write(vec![format!("DROP TABLE {}", table)]))
}
