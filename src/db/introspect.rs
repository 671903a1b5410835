//! Startup introspection of table/column metadata

use sqlx::postgres::PgPool;
use tracing::{error, info};

use crate::schema::{SchemaColumnInfo, SchemaSnapshot};

/// Columns of every table in one schema, ordered by table then position.
///
/// information_schema uses domain types, so everything is cast to text.
pub const INTROSPECTION_QUERY: &str = r#"
    SELECT table_name::text  AS table_name,
           column_name::text AS column_name,
           data_type::text   AS data_type
    FROM information_schema.columns
    WHERE table_schema = $1
    ORDER BY table_name, ordinal_position
"#;

#[derive(Debug, thiserror::Error)]
#[error("schema introspection failed: {0}")]
pub struct IntrospectionError(#[from] sqlx::Error);

pub async fn load_schema(pool: &PgPool, schema: &str) -> Result<Vec<SchemaColumnInfo>, IntrospectionError> {
    let columns = sqlx::query_as::<_, SchemaColumnInfo>(INTROSPECTION_QUERY)
        .bind(schema)
        .fetch_all(pool)
        .await?;
    Ok(columns)
}

/// Load and format the schema. Failure yields the unavailable snapshot;
/// there is no automatic retry.
pub async fn load_snapshot(pool: &PgPool, schema: &str) -> SchemaSnapshot {
    match load_schema(pool, schema).await {
        Ok(columns) => {
            info!("Loaded schema '{}': {} columns", schema, columns.len());
            SchemaSnapshot::from_columns(columns)
        }
        Err(e) => {
            error!("{}; questions will be refused until restart", e);
            SchemaSnapshot::unavailable()
        }
    }
}
