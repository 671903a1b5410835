// src/prompt/mod.rs
// Prompt builders for the two model calls of a request

pub mod explanation;
pub mod query;

pub use explanation::{
    build_explanation_prompt, serialize_results, DEFAULT_MAX_RESULT_CHARS, TRUNCATION_MARKER,
};
pub use query::build_query_prompt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("database schema is not available")]
    SchemaUnavailable,

    #[error("query results could not be serialized: {0}")]
    ResultSerialization(String),
}
