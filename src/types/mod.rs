mod command;
mod identifier;
mod row;
mod schema;
mod sql_value;

pub use command::{Command, CommandKind};
pub use identifier::validate_identifier;
pub use row::{RawQueryResult, Row};
pub use schema::{FieldSchema, FieldType, TypeMapping};
pub use sql_value::SqlValue;
