// src/lib.rs
//! Answer natural-language questions about a PostgreSQL database.
//!
//! A question becomes a Gemini-generated read-only query, passes a
//! keyword safety gate, runs against the database, and the rows are
//! explained back in plain language.

pub mod config;
pub mod db;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod schema;
pub mod server;
pub mod sql;

pub use config::AskConfig;
pub use pipeline::{AskPipeline, CallerOutcome, PipelineError, PipelineFailure, PipelineStage};
pub use schema::{FormattedSchema, SchemaCache, SchemaColumnInfo, SchemaSnapshot};
