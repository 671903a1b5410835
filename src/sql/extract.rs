//! Pull a SQL statement out of free-form model output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keywords a bare (unfenced) response may start with.
const STATEMENT_KEYWORDS: [&str; 8] = [
    "select", "insert", "update", "delete", "with", "create", "alter", "drop",
];

/// Keywords accepted as the start of an untagged fenced block.
const FENCED_KEYWORDS: [&str; 5] = ["select", "with", "update", "insert", "delete"];

static SQL_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```sql\s*(.*?)\s*```").expect("valid sql fence regex")
});

static GENERIC_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(.*?)```").expect("valid generic fence regex")
});

/// A line whose first word is a statement keyword.
static STATEMENT_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:select|insert|update|delete|with|create|alter|drop)\b")
        .expect("valid statement line regex")
});

/// Extract the candidate query from a model response.
///
/// Tried in order, first hit wins:
/// 1. a fenced block tagged `sql`;
/// 2. an untagged fenced block whose body starts with a query keyword;
/// 3. bare text starting with a statement keyword, trimmed to the first
///    line that opens with a keyword as a whole word.
///
/// Returns `None` when nothing looks like SQL.
pub fn extract_sql(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    if let Some(inner) = SQL_FENCE_REGEX.captures(raw).and_then(|c| c.get(1)) {
        let sql = inner.as_str().trim();
        if !sql.is_empty() {
            return Some(sql.to_string());
        }
    }

    if let Some(inner) = GENERIC_FENCE_REGEX.captures(raw).and_then(|c| c.get(1)) {
        let candidate = inner.as_str().trim();
        if starts_with_any(candidate, &FENCED_KEYWORDS) {
            return Some(candidate.to_string());
        }
    }

    let trimmed = raw.trim();
    if !starts_with_any(trimmed, &STATEMENT_KEYWORDS) {
        return None;
    }

    // Skip lead-in prose such as "Selecting the rows you asked for:"
    let lines: Vec<&str> = trimmed.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let lowered = line.trim().to_lowercase();
        if STATEMENT_LINE_REGEX.is_match(&lowered) {
            return Some(lines[i..].join("\n").trim().to_string());
        }
    }

    Some(trimmed.to_string())
}

fn starts_with_any(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|kw| lowered.starts_with(kw))
}
