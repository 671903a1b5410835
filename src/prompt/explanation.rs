use super::PromptError;
use crate::db::QueryResultSet;

/// Ceiling for serialized results sent to the model
pub const DEFAULT_MAX_RESULT_CHARS: usize = 3000;

pub const TRUNCATION_MARKER: &str = "\n... (results truncated)";

/// Serialize rows as pretty JSON, cutting at `max_chars` characters.
///
/// When cut, [`TRUNCATION_MARKER`] is appended. Counting is in chars so
/// the cut never lands inside a UTF-8 sequence.
pub fn serialize_results(rows: &QueryResultSet, max_chars: usize) -> Result<String, PromptError> {
    let full = serde_json::to_string_pretty(rows)
        .map_err(|e| PromptError::ResultSerialization(e.to_string()))?;
    Ok(truncate_chars(full, max_chars))
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text,
    }
}

/// Build the prompt that turns result data into a plain-language answer.
pub fn build_explanation_prompt(question: &str, results: &str) -> String {
    let mut prompt = String::new();

    // 1. Role
    prompt.push_str("Context: You are a friendly, helpful assistant. Your task is to explain the data below ");
    prompt.push_str("clearly and concisely to an end user, based on their original question.\n");
    prompt.push_str("The user must NOT learn anything about SQL or databases.\n\n");

    // 2. Question and data
    prompt.push_str(&format!("Original User Question: \"{}\"\n\n", question.trim()));
    prompt.push_str("Data:\n---\n");
    prompt.push_str(results);
    prompt.push_str("\n---\n\n");

    // 3. Rules
    prompt.push_str("Instructions for the answer:\n");
    prompt.push_str("1. Read the original question and the data.\n");
    prompt.push_str("2. Answer the original question DIRECTLY in natural language using the data.\n");
    prompt.push_str("3. Be clear, concise and friendly.\n");
    prompt.push_str("4. NEVER mention \"SQL\", \"database\", \"query\", \"JSON\", \"rows\", \"records\" or \"columns\". ");
    prompt.push_str("Speak as if you simply know the information.\n");
    prompt.push_str("5. If the data is empty (\"[]\"), say kindly that no matching information was found, e.g. ");
    prompt.push_str("\"It looks like there is no information about that right now.\"\n");
    prompt.push_str("6. If the question asked for a single extreme (\"who sold the most\", \"the cheapest product\") ");
    prompt.push_str("but several entries tie, say so explicitly and name every one of them, e.g. ");
    prompt.push_str("\"Several users are tied for the fewest sales: A and B sold 3 items each.\"\n");
    prompt.push_str("7. If the data ends with \"... (results truncated)\", you may mention there are more results ");
    prompt.push_str("than shown when relevant, but do not dwell on the truncation.\n");
    prompt.push_str("8. Reply ONLY with the final answer text. No greetings, no preamble such as ");
    prompt.push_str("\"Here is the answer:\", no sign-off.\n\n");

    prompt.push_str("Answer for the User:\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn row(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_small_results_untouched() {
        let rows = vec![row(&[("name", json!("Ana")), ("total", json!(3))])];
        let text = serialize_results(&rows, DEFAULT_MAX_RESULT_CHARS).unwrap();

        assert!(!text.contains(TRUNCATION_MARKER));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!([{ "name": "Ana", "total": 3 }]));
    }

    #[test]
    fn test_large_results_truncated_with_marker() {
        let rows: Vec<_> = (0..500)
            .map(|i| row(&[("id", json!(i)), ("name", json!(format!("user number {}", i)))]))
            .collect();
        let text = serialize_results(&rows, DEFAULT_MAX_RESULT_CHARS).unwrap();

        assert!(text.ends_with(TRUNCATION_MARKER));
        let body = text.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.chars().count(), DEFAULT_MAX_RESULT_CHARS);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = truncate_chars("ñandú ñandú".to_string(), 3);
        assert_eq!(text, format!("ñan{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_exact_length_not_truncated() {
        let text = truncate_chars("abc".to_string(), 3);
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_column_order_preserved() {
        let rows = vec![row(&[("zeta", json!(1)), ("alpha", json!(2))])];
        let text = serialize_results(&rows, DEFAULT_MAX_RESULT_CHARS).unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
    }

    #[test]
    fn test_explanation_prompt_rules() {
        let prompt = build_explanation_prompt("who sold the fewest items?", "[]");

        assert!(prompt.contains("Original User Question: \"who sold the fewest items?\""));
        assert!(prompt.contains("Data:\n---\n[]\n---"));
        assert!(prompt.contains("NEVER mention"));
        assert!(prompt.contains("tie"));
        assert!(prompt.contains("No greetings"));
    }
}
