//! Question-answering pipeline
//!
//! Sequences one request through the components:
//!
//! ```text
//! question → query prompt → model → extract → safety gate → execute
//!          → explanation prompt → model → answer
//! ```
//!
//! Each step finishes before the next starts. Every step is raced against
//! a [`CancellationToken`] so an abandoned request stops its in-flight
//! model or database call. This is the only place where component errors
//! become a caller-facing outcome (see [`PipelineFailure::caller_outcome`]).

mod error;
mod stage;

pub use error::{
    CallerOutcome, PipelineError, PipelineFailure, GENERIC_FAILURE_MESSAGE, REFUSAL_MESSAGE,
};
pub use stage::PipelineStage;

use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::db::{QueryExecutor, QueryResultSet};
use crate::llm::TextGenerator;
use crate::prompt::{self, DEFAULT_MAX_RESULT_CHARS};
use crate::schema::SchemaCache;
use crate::sql::{self, SafetyVerdict};

pub struct AskPipeline {
    llm: Arc<dyn TextGenerator>,
    executor: Arc<dyn QueryExecutor>,
    schema: Arc<SchemaCache>,
    model: String,
    max_result_chars: usize,
}

impl AskPipeline {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        executor: Arc<dyn QueryExecutor>,
        schema: Arc<SchemaCache>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            executor,
            schema,
            model: model.into(),
            max_result_chars: DEFAULT_MAX_RESULT_CHARS,
        }
    }

    pub fn with_max_result_chars(mut self, max_result_chars: usize) -> Self {
        self.max_result_chars = max_result_chars;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn schema(&self) -> &Arc<SchemaCache> {
        &self.schema
    }

    /// Answer one question.
    ///
    /// On failure the returned [`PipelineFailure`] records the stage that
    /// was interrupted; full detail is logged here and never leaves it.
    #[tracing::instrument(skip_all, fields(question_len = question.len()))]
    pub async fn ask(&self, question: &str, cancel: &CancellationToken) -> Result<String, PipelineFailure> {
        let mut stage = PipelineStage::Idle;

        match self.run(question, cancel, &mut stage).await {
            Ok(answer) => {
                advance(&mut stage, PipelineStage::Done);
                info!("Generated final explanation for user");
                Ok(answer)
            }
            Err(err) => {
                let failure = PipelineFailure::new(stage, err);
                if failure.is_rejection() {
                    warn!("Process stopped at {}: {}", failure.stage, failure.error);
                } else {
                    error!("Pipeline failed at {}: {:?}", failure.stage, failure.error);
                }
                Err(failure)
            }
        }
    }

    async fn run(
        &self,
        question: &str,
        cancel: &CancellationToken,
        stage: &mut PipelineStage,
    ) -> Result<String, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::Unexpected("empty question".to_string()));
        }

        advance(stage, PipelineStage::GeneratingQuery);
        let candidate = self.generate_query(question, cancel).await?;

        advance(stage, PipelineStage::Validating);
        if let SafetyVerdict::Rejected { keyword } = sql::check_query(&candidate) {
            warn!(keyword, query = %candidate, "Generated query rejected");
            return Err(PipelineError::ForbiddenOperation { keyword });
        }

        advance(stage, PipelineStage::Executing);
        let rows = until_cancelled(cancel, self.executor.execute(&candidate)).await??;

        advance(stage, PipelineStage::Explaining);
        self.explain(question, &rows, cancel).await
    }

    /// Ask the model for SQL and pull the statement out of its reply.
    async fn generate_query(&self, question: &str, cancel: &CancellationToken) -> Result<String, PipelineError> {
        let schema = self.schema.formatted();
        let prompt = prompt::build_query_prompt(question, &schema)?;

        let raw = until_cancelled(cancel, self.llm.generate(&self.model, &prompt)).await??;

        match sql::extract_sql(&raw) {
            Some(candidate) => {
                debug!("Extracted SQL candidate ({} chars)", candidate.len());
                Ok(candidate)
            }
            None => {
                warn!("Could not extract a SQL query from model response. Raw text: {:?}", raw);
                Err(PipelineError::ExtractionFailure)
            }
        }
    }

    /// Turn result rows into the final answer text.
    async fn explain(
        &self,
        question: &str,
        rows: &QueryResultSet,
        cancel: &CancellationToken,
    ) -> Result<String, PipelineError> {
        let results = prompt::serialize_results(rows, self.max_result_chars)?;
        let prompt = prompt::build_explanation_prompt(question, &results);
        debug!("Explanation prompt built ({} rows, {} chars)", rows.len(), prompt.len());

        let text = until_cancelled(cancel, self.llm.generate(&self.model, &prompt)).await??;
        Ok(text.trim().to_string())
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug_assert_eq!(stage.next(), Some(next), "stage {} cannot move to {}", stage, next);
    debug!("stage {} -> {}", stage, next);
    *stage = next;
}

/// Resolve `fut` unless `cancel` fires first.
async fn until_cancelled<F>(cancel: &CancellationToken, fut: F) -> Result<F::Output, PipelineError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        out = fut => Ok(out),
    }
}
