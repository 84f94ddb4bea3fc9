use crate::error::{CrudResult, FieldRole, Operation};
use crate::qb::Statement;
use crate::qb::dialect::Dialect;
use crate::qb::filter::{push_where, validate};
use crate::value::Fields;

/// How a column appears in the select list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Plain,
    /// `(<name> = '1')`, so bit and boolean columns decode as `bool`.
    Bool,
    /// `rtrim(<name>)`. Postgres returns fixed-width `char(n)` values padded
    /// with blanks; trimming gives back the value that was stored.
    Trimmed,
}

/// One projected column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectColumn<'a> {
    pub name: &'a str,
    pub projection: Projection,
}

impl<'a> SelectColumn<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            projection: Projection::Plain,
        }
    }

    pub fn boolean(name: &'a str) -> Self {
        Self {
            name,
            projection: Projection::Bool,
        }
    }

    pub fn trimmed(name: &'a str) -> Self {
        Self {
            name,
            projection: Projection::Trimmed,
        }
    }
}

/// Render `select <cols> from <table>` without a where clause.
///
/// Generated code renders this once into a constant and passes it to
/// [`select`] on every call.
pub fn select_sql(table: &str, columns: &[SelectColumn<'_>]) -> String {
    let cols: Vec<String> = columns
        .iter()
        .map(|c| match c.projection {
            Projection::Plain => c.name.to_string(),
            Projection::Bool => format!("({} = '1')", c.name),
            Projection::Trimmed => format!("rtrim({})", c.name),
        })
        .collect();
    format!("select {} from {table}", cols.join(", "))
}

/// Append the where clause for `query` to `base_sql`.
///
/// Every key is checked with `contains` before any SQL is built.
pub fn select<'a, F>(
    dialect: Dialect,
    base_sql: &str,
    query: &'a Fields,
    contains: F,
) -> CrudResult<Statement<'a>>
where
    F: Fn(&str) -> bool,
{
    validate(Operation::Select, FieldRole::Query, query, &contains)?;

    let mut sql = base_sql.to_string();
    let mut values = Vec::with_capacity(query.len());
    let mut ph = dialect.placeholders();
    push_where(&mut sql, &mut values, &mut ph, query);
    Ok(Statement::new(sql, values))
}
