//! Statement grammar for generated CRUD functions.
//!
//! Every generated function renders its SQL through this module, so the
//! placeholder style, the `where` layout and the field validation are shared
//! by all entities.
//!
//! # Grammar
//!
//! - insert: `insert into <t> set c1=?, c2=?` (MySQL) or
//!   `insert into <t> (c1, c2) values ($1, $2) returning <id>` (Postgres)
//! - select: `select <cols> from <t>` plus an optional where clause;
//!   boolean columns are projected as `(<c> = '1')`
//! - where: `k1=? and k2=?` in payload order; empty payload means no clause
//! - update: `update <t> set k=?, ... where ...`
//! - delete: `delete from <t> where ...`
//!
//! # Usage
//!
//! ```ignore
//! use dbcrud::qb::{self, Dialect};
//! use dbcrud::{Fields, Operation};
//!
//! let query = Fields::new().with("some_int", 45i64);
//! let stmt = qb::select(Dialect::Postgres, SELECT_SQL, &query, model_contains_field)?;
//! let rows = db.query(&stmt.sql, &stmt.params()).await?;
//! ```

mod delete;
mod dialect;
mod filter;
mod insert;
mod select;
mod update;

pub use delete::delete;
pub use dialect::{Dialect, Placeholders};
pub use filter::validate;
pub use insert::insert_sql;
pub use select::{Projection, SelectColumn, select, select_sql};
pub use update::update;

use tokio_postgres::types::ToSql;

use crate::value::Value;

/// Rendered SQL plus the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement<'a> {
    pub sql: String,
    values: Vec<&'a Value>,
}

impl<'a> Statement<'a> {
    pub(crate) fn new(sql: String, values: Vec<&'a Value>) -> Self {
        Self { sql, values }
    }

    /// Append `limit n`. Both dialects accept the same syntax.
    pub fn with_limit(mut self, n: usize) -> Self {
        self.sql.push_str(&format!(" limit {n}"));
        self
    }

    /// Bound values, in placeholder order.
    pub fn values(&self) -> &[&'a Value] {
        &self.values
    }

    /// Parameters as references for tokio-postgres.
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| *v as &(dyn ToSql + Sync))
            .collect()
    }
}

#[cfg(test)]
mod tests;
