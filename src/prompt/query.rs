use super::PromptError;
use crate::schema::FormattedSchema;

/// Build the prompt that asks the model for a single PostgreSQL query.
///
/// Refuses to build anything when the schema is unavailable, so the model
/// is never asked to guess table names.
pub fn build_query_prompt(question: &str, schema: &FormattedSchema) -> Result<String, PromptError> {
    if !schema.is_available() {
        return Err(PromptError::SchemaUnavailable);
    }

    let mut prompt = String::new();

    // 1. Role and target dialect
    prompt.push_str("Context: You are an expert SQL assistant. Your task is to write a robust, complete SQL query ");
    prompt.push_str("that answers the user's question using the database schema below.\n");
    prompt.push_str("Database: PostgreSQL\n\n");

    // 2. Schema and question
    prompt.push_str("Database Schema:\n---\n");
    prompt.push_str(schema.as_str());
    prompt.push_str("\n---\n\n");
    prompt.push_str(&format!("User Question: \"{}\"\n\n", question.trim()));

    // 3. Rules
    prompt.push_str("Key instructions for the query:\n");
    prompt.push_str("1. Analyze the schema and the question carefully. Use only the tables and columns listed above.\n");
    prompt.push_str("2. Write the most complete and robust query that answers the question, anticipating common ambiguities.\n");
    prompt.push_str("3. Minimums, maximums and ties: if the question asks for a minimum, maximum, \"top N\", \"bottom N\" ");
    prompt.push_str("or similar (for example \"who sold the fewest items?\"), the query MUST return ALL rows that share ");
    prompt.push_str("the extreme value. Never return a single arbitrary row when several rows tie.\n");
    prompt.push_str("4. Aggregations: when the question aggregates (sum, average, count, min, max) over groups, ");
    prompt.push_str("group correctly with GROUP BY.\n");
    prompt.push_str("5. Use valid PostgreSQL syntax. Common Table Expressions (WITH) are welcome when they make complex logic clearer.\n");
    prompt.push_str("6. Identifiers: PostgreSQL folds unquoted identifiers to lower case. To preserve case (for example ");
    prompt.push_str("'userId' or 'createdAt'), wrap EVERY table and column name in double quotes, e.g. ");
    prompt.push_str("SELECT s.\"userId\", s.\"quantity\" FROM \"sales\" s JOIN \"users\" u ON s.\"userId\" = u.\"id\"; ");
    prompt.push_str("Simple table aliases such as s or u need no quotes.\n");
    prompt.push_str("7. Return ONLY the SQL query: a single read-only statement. No explanations, no comments, ");
    prompt.push_str("no introductory or closing text and no code fences. Just the raw SQL text.\n\n");

    prompt.push_str("Generated SQL Query:\n");

    Ok(prompt)
}
