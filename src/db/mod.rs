//! PostgreSQL access: pool setup, read-only query execution, introspection

mod introspect;

pub use introspect::{load_schema, load_snapshot, IntrospectionError, INTROSPECTION_QUERY};

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, error};

/// One result row: column name to value, in the order the store returned them.
pub type Record = Map<String, Value>;

/// Rows returned by a generated query. Shape depends entirely on the query.
pub type QueryResultSet = Vec<Record>;

/// Execution failure. `Display` never includes driver text or SQL.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("query execution failed")]
    Database(#[from] sqlx::Error),

    #[error("query result could not be decoded")]
    Decode(#[from] serde_json::Error),
}

/// Runs one validated, read-only statement.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<QueryResultSet, ExecutionError>;
}

/// Create the PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        // Don't wait too long for a connection
        .acquire_timeout(Duration::from_secs(10))
        // Recycle connections periodically
        .max_lifetime(Duration::from_secs(1800))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))
}

/// Wrap a statement so PostgreSQL returns each row as one JSON object.
///
/// `row_to_json` keeps the row's column order and renders any column type
/// (numeric, timestamps, arrays) as JSON. Rows stream back one per result
/// row, in the order the statement produced them.
pub fn wrap_as_json_rows(sql: &str) -> String {
    let statement = sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    format!(
        "SELECT row_to_json(q)::text FROM (\n{}\n) AS q",
        statement.trim_start()
    )
}

pub(crate) fn parse_json_rows<S: AsRef<str>>(payloads: &[S]) -> Result<QueryResultSet, ExecutionError> {
    payloads
        .iter()
        .map(|payload| serde_json::from_str::<Record>(payload.as_ref()).map_err(ExecutionError::from))
        .collect()
}

pub struct PgQueryExecutor {
    pool: PgPool,
    statement_timeout_ms: u64,
}

impl PgQueryExecutor {
    pub fn new(pool: PgPool, statement_timeout_ms: u64) -> Self {
        Self {
            pool,
            statement_timeout_ms,
        }
    }

    async fn run_read_only(&self, sql: &str) -> Result<QueryResultSet, ExecutionError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        let timeout = format!("SET LOCAL statement_timeout = {}", self.statement_timeout_ms);
        sqlx::query(&timeout).execute(&mut *tx).await?;

        let wrapped = wrap_as_json_rows(sql);
        let payloads: Vec<String> = sqlx::query_scalar(&wrapped).fetch_all(&mut *tx).await?;

        // Nothing to keep from a read-only transaction
        tx.rollback().await?;

        parse_json_rows(&payloads)
    }
}

#[async_trait]
impl QueryExecutor for PgQueryExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryResultSet, ExecutionError> {
        match self.run_read_only(sql).await {
            Ok(rows) => {
                debug!("Query executed successfully ({} rows)", rows.len());
                Ok(rows)
            }
            Err(e) => {
                let detail = match &e {
                    ExecutionError::Database(inner) => inner.to_string(),
                    ExecutionError::Decode(inner) => inner.to_string(),
                };
                error!(sql = %sql, "Database query execution failed: {}", detail);
                Err(e)
            }
        }
    }
}
