use crate::error::Result;
use crate::types::{validate_identifier, SqlValue};

/// Represents a WHERE clause condition built from equality filters.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    /// field = value
    Eq(String, SqlValue),
    /// clause AND clause
    And(Box<WhereClause>, Box<WhereClause>),
}

impl WhereClause {
    /// Creates an equality condition: field = value.
    /// The field name must be a plain identifier.
    pub fn eq<V: Into<SqlValue>>(field: &str, value: V) -> Result<Self> {
        validate_identifier(field)?;
        Ok(WhereClause::Eq(field.to_string(), value.into()))
    }

    /// Combines this clause with another using AND
    pub fn and(self, other: WhereClause) -> Self {
        WhereClause::And(Box::new(self), Box::new(other))
    }

    /// AND-chains equality filters in the given order.
    /// Returns `None` when there are no filters.
    pub fn all<'a, I>(filters: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = (&'a str, &'a SqlValue)>,
    {
        let mut clause: Option<WhereClause> = None;
        for (field, value) in filters {
            let eq = WhereClause::eq(field, value.clone())?;
            clause = Some(match clause {
                Some(prev) => prev.and(eq),
                None => eq,
            });
        }
        Ok(clause)
    }

    /// Builds the SQL fragment with values rendered as literals.
    pub fn build_sql(&self) -> String {
        match self {
            WhereClause::Eq(field, value) => format!("{} = {}", field, value.to_literal()),
            WhereClause::And(left, right) => {
                format!("{} AND {}", left.build_sql(), right.build_sql())
            }
        }
    }
}
