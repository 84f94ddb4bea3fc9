//! Generic client trait for unified database access.

use crate::error::CrudResult;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A trait that unifies database clients and transactions.
///
/// Generated CRUD functions accept `&impl GenericClient`, so they run the same
/// way on a plain connection or inside a transaction.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = CrudResult<Vec<Row>>> + Send;

    /// Execute a query that must return exactly one row.
    ///
    /// Any other row count is reported by the driver as a [`CrudError::Query`](crate::CrudError::Query).
    fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = CrudResult<Row>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = CrudResult<u64>> + Send;
}

#[inline]
fn trace_sql(kind: &'static str, sql: &str, params: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "dbcrud.sql", kind, params, sql, "executing");
    #[cfg(not(feature = "tracing"))]
    let _ = (kind, sql, params);
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Vec<Row>> {
        trace_sql("query", sql, params.len());
        Ok(tokio_postgres::Client::query(self, sql, params).await?)
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Row> {
        trace_sql("query_one", sql, params.len());
        Ok(tokio_postgres::Client::query_one(self, sql, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<u64> {
        trace_sql("execute", sql, params.len());
        Ok(tokio_postgres::Client::execute(self, sql, params).await?)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Vec<Row>> {
        trace_sql("query", sql, params.len());
        Ok(tokio_postgres::Transaction::query(self, sql, params).await?)
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Row> {
        trace_sql("query_one", sql, params.len());
        Ok(tokio_postgres::Transaction::query_one(self, sql, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<u64> {
        trace_sql("execute", sql, params.len());
        Ok(tokio_postgres::Transaction::execute(self, sql, params).await?)
    }
}
