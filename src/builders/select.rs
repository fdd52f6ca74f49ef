use crate::clauses::WhereClause;
use crate::error::Result;
use crate::types::{validate_identifier, Command, SqlValue};

/// Query parameters that control the request rather than filter rows.
pub const RESERVED_PARAMS: &[&str] = &["no_op"];

/// Turns raw query parameters into typed equality filters, dropping the
/// reserved ones. Order is preserved.
pub fn filters_from_params(params: &[(String, String)]) -> Vec<(String, SqlValue)> {
    params
        .iter()
        .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), SqlValue::infer(v)))
        .collect()
}

/// Builds `SELECT * FROM table`, with an AND-chained equality predicate
/// when filters are given.
pub fn select(table: &str, filters: &[(String, SqlValue)]) -> Result<Command> {
    let table = validate_identifier(table)?;

    let mut sql = String::with_capacity(64);
    sql.push_str("SELECT * FROM ");
    sql.push_str(table);

    if let Some(clause) = WhereClause::all(filters.iter().map(|(f, v)| (f.as_str(), v)))? {
        sql.push_str(" WHERE ");
        sql.push_str(&clause.build_sql());
    }

    Ok(Command::read(sql))
}
