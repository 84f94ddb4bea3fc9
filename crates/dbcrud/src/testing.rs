//! Throwaway databases for generated round-trip tests.
//!
//! Each [`TestDatabase`] gets its own schema on the server named by
//! `DATABASE_URL`, so test cases never see each other's rows.

use std::sync::Arc;

use tokio_postgres::{Client, NoTls};
use uuid::Uuid;

use crate::context::DbContext;
use crate::error::CrudResult;

/// A connection scoped to a freshly created schema.
pub struct TestDatabase {
    client: Arc<Client>,
    schema: String,
}

impl TestDatabase {
    /// Open a database for `DATABASE_URL` (a `.env` file is honored) and
    /// apply `schema_sql` to it.
    ///
    /// Returns `Ok(None)` when no database is configured, so generated tests
    /// skip instead of failing on machines without Postgres.
    pub async fn from_env(schema_sql: &str) -> CrudResult<Option<Self>> {
        dotenvy::dotenv().ok();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };
        Self::open(&url, schema_sql).await.map(Some)
    }

    /// Connect to `url`, create a unique schema and apply `schema_sql` in it.
    pub async fn open(url: &str, schema_sql: &str) -> CrudResult<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("tokio-postgres connection error: {e}");
            }
        });

        let schema = format!("dbcrud_test_{}", Uuid::new_v4().simple());
        client
            .batch_execute(&format!(
                "CREATE SCHEMA {schema}; SET search_path TO {schema};"
            ))
            .await?;
        client.batch_execute(schema_sql).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(target: "dbcrud.sql", %schema, "created test schema");

        Ok(Self {
            client: Arc::new(client),
            schema,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// A context carrying this connection, for context-mode CRUD functions.
    pub fn context(&self) -> DbContext {
        DbContext::new().with_shared_db(Arc::clone(&self.client))
    }

    /// Drop the schema and everything in it.
    pub async fn close(self) -> CrudResult<()> {
        self.client
            .batch_execute(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .await?;
        Ok(())
    }
}
