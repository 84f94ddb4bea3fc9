use crate::error::{CrudResult, FieldRole, Operation};
use crate::qb::Statement;
use crate::qb::dialect::Dialect;
use crate::qb::filter::{push_assignments, push_where, validate};
use crate::value::Fields;

/// Render `update <table> set ... where ...`.
///
/// Returns `Ok(None)` for an empty `updates` payload: there is nothing to
/// execute and neither payload is inspected. Otherwise update keys are
/// validated first, then query keys.
pub fn update<'a, F>(
    dialect: Dialect,
    table: &str,
    updates: &'a Fields,
    query: &'a Fields,
    contains: F,
) -> CrudResult<Option<Statement<'a>>>
where
    F: Fn(&str) -> bool,
{
    if updates.is_empty() {
        return Ok(None);
    }
    validate(Operation::Update, FieldRole::Update, updates, &contains)?;
    validate(Operation::Update, FieldRole::Query, query, &contains)?;

    let mut sql = format!("update {table} set ");
    let mut values = Vec::with_capacity(updates.len() + query.len());
    let mut ph = dialect.placeholders();
    push_assignments(&mut sql, &mut values, &mut ph, updates, ", ");
    push_where(&mut sql, &mut values, &mut ph, query);
    Ok(Some(Statement::new(sql, values)))
}
