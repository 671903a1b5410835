// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use asksql::db::{ExecutionError, QueryExecutor, QueryResultSet, Record};
use asksql::llm::{LlmError, TextGenerator};
use asksql::schema::{SchemaCache, SchemaColumnInfo, SchemaSnapshot};
use asksql::AskPipeline;

pub const TEST_MODEL: &str = "test-model";

/// Model stub that replays scripted replies in order and records every prompt.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Replies with `sql` first, then `answer`.
    pub fn answering(sql: &str, answer: &str) -> Arc<Self> {
        Self::new(vec![Ok(sql.to_string()), Ok(answer.to_string())])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        assert_eq!(model, TEST_MODEL);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyGeneration))
    }
}

/// Executor stub that counts calls and returns fixed rows, a failure, or hangs.
pub struct RecordingExecutor {
    rows: QueryResultSet,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn returning(rows: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            rows: rows.into_iter().map(record).collect(),
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
            statements: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            rows: Vec::new(),
            fail: true,
            delay: None,
            calls: AtomicUsize::new(0),
            statements: Mutex::new(Vec::new()),
        })
    }

    pub fn hanging(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            rows: Vec::new(),
            fail: false,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            statements: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryResultSet, ExecutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.statements.lock().unwrap().push(sql.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ExecutionError::Database(sqlx::Error::RowNotFound));
        }
        Ok(self.rows.clone())
    }
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// users(id, name) and sales(id, userId, quantity)
pub fn sales_schema() -> Arc<SchemaCache> {
    let columns = vec![
        SchemaColumnInfo::new("users", "id", "integer"),
        SchemaColumnInfo::new("users", "name", "text"),
        SchemaColumnInfo::new("sales", "id", "integer"),
        SchemaColumnInfo::new("sales", "userId", "integer"),
        SchemaColumnInfo::new("sales", "quantity", "integer"),
    ];
    Arc::new(SchemaCache::new(SchemaSnapshot::from_columns(columns)))
}

pub fn pipeline(
    model: Arc<ScriptedModel>,
    executor: Arc<RecordingExecutor>,
    schema: Arc<SchemaCache>,
) -> AskPipeline {
    AskPipeline::new(model, executor, schema, TEST_MODEL)
}

pub fn tied_users() -> Vec<Value> {
    vec![
        json!({ "name": "Ana", "total": 3 }),
        json!({ "name": "Bruno", "total": 3 }),
    ]
}

pub const TIE_SQL: &str = "```sql\nWITH totals AS (\n  SELECT u.\"name\", SUM(s.\"quantity\") AS total\n  FROM \"sales\" s JOIN \"users\" u ON s.\"userId\" = u.\"id\"\n  GROUP BY u.\"name\"\n)\nSELECT name, total FROM totals WHERE total = (SELECT MIN(total) FROM totals);\n```";
