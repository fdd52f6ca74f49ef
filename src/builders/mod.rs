//! Statement builders.
//!
//! Pure functions turning a table name plus a schema, filters or row data into
//! a backend-native [`Command`](crate::types::Command). Table and field names
//! are checked against the identifier pattern before interpolation, and values
//! are rendered as escaped literals so the dry-run text is exactly what runs.

mod delete;
mod insert;
mod select;
mod table;

pub use delete::{delete, FIELD_NAME_PARAM, FIELD_VALUE_PARAM};
pub use insert::{insert, rows_from_json, RowData};
pub use select::{filters_from_params, select, RESERVED_PARAMS};
pub use table::{create_table, drop_table};
