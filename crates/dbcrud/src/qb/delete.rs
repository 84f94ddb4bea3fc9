use crate::error::{CrudResult, FieldRole, Operation};
use crate::qb::Statement;
use crate::qb::dialect::Dialect;
use crate::qb::filter::{push_where, validate};
use crate::value::Fields;

/// Render `delete from <table> where ...`.
///
/// An empty `query` matches every row.
pub fn delete<'a, F>(
    dialect: Dialect,
    table: &str,
    query: &'a Fields,
    contains: F,
) -> CrudResult<Statement<'a>>
where
    F: Fn(&str) -> bool,
{
    validate(Operation::Delete, FieldRole::Query, query, &contains)?;

    let mut sql = format!("delete from {table}");
    let mut values = Vec::with_capacity(query.len());
    let mut ph = dialect.placeholders();
    push_where(&mut sql, &mut values, &mut ph, query);
    Ok(Statement::new(sql, values))
}
