//! Database schema context for query generation
//!
//! Column metadata is introspected once at startup (see `db::introspect`),
//! rendered into prompt text by [`format_schema`] and kept in a
//! process-wide [`SchemaCache`] that is read-only while serving.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Text used whenever there is no schema to show the model.
pub const NO_SCHEMA_AVAILABLE: &str = "No schema information available.";

/// One introspected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SchemaColumnInfo {
    #[serde(rename = "table_name")]
    #[sqlx(rename = "table_name")]
    pub table: String,
    #[serde(rename = "column_name")]
    #[sqlx(rename = "column_name")]
    pub column: String,
    pub data_type: String,
}

impl SchemaColumnInfo {
    pub fn new(table: impl Into<String>, column: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            data_type: data_type.into(),
        }
    }
}

/// Prompt-ready schema text.
///
/// An unavailable schema is represented by the [`NO_SCHEMA_AVAILABLE`]
/// sentinel rather than an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSchema(String);

impl FormattedSchema {
    pub fn unavailable() -> Self {
        Self(NO_SCHEMA_AVAILABLE.to_string())
    }

    pub fn is_available(&self) -> bool {
        let text = self.0.trim();
        !text.is_empty() && text != NO_SCHEMA_AVAILABLE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FormattedSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Group columns by table and render them as prompt text.
///
/// Tables appear in first-seen order and columns keep their input order.
/// Empty input yields the sentinel.
pub fn format_schema(columns: &[SchemaColumnInfo]) -> FormattedSchema {
    if columns.is_empty() {
        return FormattedSchema::unavailable();
    }

    let mut tables: Vec<(&str, Vec<&SchemaColumnInfo>)> = Vec::new();
    for column in columns {
        match tables.iter_mut().find(|(name, _)| *name == column.table) {
            Some((_, cols)) => cols.push(column),
            None => tables.push((column.table.as_str(), vec![column])),
        }
    }

    let mut out = String::from("Database Schema:\n");
    for (table, cols) in &tables {
        out.push_str(&format!("Table: {}\n", table));
        out.push_str("  Columns:\n");
        for col in cols {
            out.push_str(&format!("    - {}: {}\n", col.column, col.data_type));
        }
        out.push('\n');
    }

    let trimmed = out.trim();
    if trimmed.is_empty() {
        FormattedSchema::unavailable()
    } else {
        FormattedSchema(trimmed.to_string())
    }
}

/// A formatted schema together with the columns it was built from.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    pub columns: Vec<SchemaColumnInfo>,
    pub formatted: FormattedSchema,
}

impl SchemaSnapshot {
    pub fn from_columns(columns: Vec<SchemaColumnInfo>) -> Self {
        let formatted = format_schema(&columns);
        Self { columns, formatted }
    }

    pub fn unavailable() -> Self {
        Self {
            columns: Vec::new(),
            formatted: FormattedSchema::unavailable(),
        }
    }
}

/// Process-wide schema holder.
///
/// Filled once during startup before the listener binds. Readers get a
/// cheap `Arc` clone; [`SchemaCache::replace`] swaps the whole snapshot so
/// no reader ever observes a partially updated value.
pub struct SchemaCache {
    current: RwLock<Arc<SchemaSnapshot>>,
}

impl SchemaCache {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(SchemaSnapshot::unavailable())
    }

    pub fn snapshot(&self) -> Arc<SchemaSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn formatted(&self) -> FormattedSchema {
        self.snapshot().formatted.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().formatted.is_available()
    }

    /// Swap in a new snapshot, returning the previous one.
    pub fn replace(&self, snapshot: SchemaSnapshot) -> Arc<SchemaSnapshot> {
        let next = Arc::new(snapshot);
        match self.current.write() {
            Ok(mut guard) => std::mem::replace(&mut *guard, next),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), next),
        }
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::unavailable()
    }
}
