//! Field validation and the `k=? and k=?` where clause.

use crate::error::{CrudError, CrudResult, FieldRole, Operation};
use crate::qb::dialect::Placeholders;
use crate::value::{Fields, Value};

/// Check every key of `fields` against the entity's column set.
///
/// Reports the first unknown key, in payload order.
pub fn validate<F>(op: Operation, role: FieldRole, fields: &Fields, contains: &F) -> CrudResult<()>
where
    F: Fn(&str) -> bool,
{
    match fields.iter().find(|(name, _)| !contains(name)) {
        Some((name, _)) => Err(CrudError::unknown_field(op, role, name)),
        None => Ok(()),
    }
}

/// Render `k=<ph>` pairs joined by `sep`, collecting their values.
pub(crate) fn push_assignments<'a>(
    sql: &mut String,
    values: &mut Vec<&'a Value>,
    placeholders: &mut Placeholders,
    fields: &'a Fields,
    sep: &str,
) {
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            sql.push_str(sep);
        }
        sql.push_str(name);
        sql.push('=');
        sql.push_str(&placeholders.next());
        values.push(value);
    }
}

/// Append ` where k1=? and k2=?`; nothing for an empty payload.
pub(crate) fn push_where<'a>(
    sql: &mut String,
    values: &mut Vec<&'a Value>,
    placeholders: &mut Placeholders,
    query: &'a Fields,
) {
    if query.is_empty() {
        return;
    }
    sql.push_str(" where ");
    push_assignments(sql, values, placeholders, query, " and ");
}
