use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::identifier::validate_identifier;

/// Abstract field type exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" => Ok(FieldType::String),
            "int" => Ok(FieldType::Int),
            "boolean" => Ok(FieldType::Boolean),
            _ => Err(()),
        }
    }
}

/// Per-backend mapping from abstract field type to native column type.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapping {
    entries: &'static [(FieldType, &'static str)],
}

impl TypeMapping {
    pub const fn new(entries: &'static [(FieldType, &'static str)]) -> Self {
        Self { entries }
    }

    /// Returns the native column type for `field_type`, if the backend supports it.
    pub fn native(&self, field_type: FieldType) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(ty, _)| *ty == field_type)
            .map(|(_, native)| *native)
    }

    /// Wire names of every supported abstract type, in declaration order.
    pub fn supported(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(ty, _)| ty.as_str()).collect()
    }
}

/// A validated table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    fields: Vec<(String, FieldType)>,
    key: Option<String>,
}

impl FieldSchema {
    /// Validates a table-definition payload of the form
    /// `{"fields": {"name": "string", ...}, "key": "name"}`.
    ///
    /// Fails with [`Error::SchemaValidation`] describing the first violation.
    pub fn validate(payload: &Value, mapping: &TypeMapping) -> Result<Self> {
        let obj = payload
            .as_object()
            .ok_or_else(|| invalid(format!("{} is not of type 'object'", payload)))?;

        if let Some(extra) = obj.keys().find(|k| *k != "fields" && *k != "key") {
            return Err(invalid(format!(
                "additional properties are not allowed ('{}' was unexpected)",
                extra
            )));
        }

        let fields = obj
            .get("fields")
            .ok_or_else(|| invalid("'fields' is a required property"))?
            .as_object()
            .ok_or_else(|| invalid("'fields' is not of type 'object'"))?;

        if fields.is_empty() {
            return Err(invalid("'fields' must declare at least one field"));
        }

        let mut validated = Vec::with_capacity(fields.len());
        for (name, ty) in fields {
            validate_identifier(name)?;
            let field_type = ty
                .as_str()
                .and_then(|s| s.parse::<FieldType>().ok())
                .filter(|ft| mapping.native(*ft).is_some())
                .ok_or_else(|| {
                    invalid(format!(
                        "{} is not one of {:?} (field '{}')",
                        ty,
                        mapping.supported(),
                        name
                    ))
                })?;
            validated.push((name.clone(), field_type));
        }

        let key = match obj.get("key") {
            None => None,
            Some(Value::String(key)) => {
                if !fields.contains_key(key) {
                    return Err(invalid(format!("key '{}' is not a declared field", key)));
                }
                Some(key.clone())
            }
            Some(other) => return Err(invalid(format!("{} is not of type 'string'", other))),
        };

        Ok(Self {
            fields: validated,
            key,
        })
    }

    /// Declared fields in request order.
    pub fn fields(&self) -> &[(String, FieldType)] {
        &self.fields
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::SchemaValidation(msg.into())
}
