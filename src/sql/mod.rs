//! Model-output SQL handling: extraction and the read-only safety gate.

pub mod extract;
pub mod safety;

pub use extract::extract_sql;
pub use safety::{check_query, SafetyVerdict, FORBIDDEN_KEYWORDS};
