//! Deny-list gate for generated SQL.
//!
//! This is a keyword heuristic, not a parser. It rejects identifiers
//! that happen to equal a keyword (a column literally named `set`) and
//! can be bypassed by obfuscation such as comments splitting a keyword.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Keywords that mark a statement as mutating or privileged.
pub const FORBIDDEN_KEYWORDS: [&str; 13] = [
    "DELETE", "UPDATE", "INSERT", "DROP", "ALTER", "TRUNCATE",
    "CREATE", "GRANT", "REVOKE", "EXEC", "EXECUTE", "SET", "MERGE",
];

static FORBIDDEN_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    FORBIDDEN_KEYWORDS
        .iter()
        .map(|kw| {
            let pattern = format!(r"\b{}\b", kw);
            (*kw, Regex::new(&pattern).expect("valid keyword regex"))
        })
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyVerdict {
    Accepted,
    Rejected { keyword: &'static str },
}

impl SafetyVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SafetyVerdict::Accepted)
    }
}

/// Check a candidate for any forbidden keyword as a whole word, anywhere.
///
/// Matching is case-insensitive. The first keyword found (in deny-list
/// order) is reported.
pub fn check_query(query: &str) -> SafetyVerdict {
    if query.trim().is_empty() {
        // Nothing to run; treat like any other unusable candidate
        return SafetyVerdict::Rejected { keyword: "" };
    }

    let upper = query.to_uppercase();
    for (keyword, regex) in FORBIDDEN_PATTERNS.iter() {
        if regex.is_match(&upper) {
            warn!("Forbidden keyword \"{}\" detected in query", keyword);
            return SafetyVerdict::Rejected { keyword };
        }
    }

    SafetyVerdict::Accepted
}
