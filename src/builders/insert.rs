use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{validate_identifier, Command, SqlValue};

/// One row to insert: field names with their values, in request order.
pub type RowData = Vec<(String, SqlValue)>;

/// Parses a row-insert payload (`[{"name": "t-shirt", "price": 10}, ...]`).
/// Rows are not checked against any declared schema.
pub fn rows_from_json(payload: &Value) -> Result<Vec<RowData>> {
    let rows = payload
        .as_array()
        .ok_or_else(|| Error::InvalidPayload("expected an array of row objects".to_string()))?;
    if rows.is_empty() {
        return Err(Error::InvalidPayload("no rows to insert".to_string()));
    }

    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<RowData> {
            let obj = row
                .as_object()
                .ok_or_else(|| Error::InvalidPayload(format!("row {} is not an object", i)))?;
            if obj.is_empty() {
                return Err(Error::InvalidPayload(format!("row {} has no fields", i)));
            }
            obj.iter()
                .map(|(field, value)| SqlValue::from_json(value).map(|v| (field.clone(), v)))
                .collect()
        })
        .collect()
}

/// Builds one `INSERT` statement per row.
pub fn insert(table: &str, rows: &[RowData]) -> Result<Command> {
    let table = validate_identifier(table)?;
    if rows.is_empty() {
        return Err(Error::InvalidPayload("no rows to insert".to_string()));
    }

    let statements = rows
        .iter()
        .map(|row| -> Result<String> {
            let mut fields = Vec::with_capacity(row.len());
            let mut values = Vec::with_capacity(row.len());
            for (field, value) in row {
                fields.push(validate_identifier(field)?);
                values.push(value.to_literal());
            }
            Ok(format!(
                "INSERT INTO {}({}) VALUES ({})",
                table,
                fields.join(","),
                values.join(",")
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Command::write(statements))
}
