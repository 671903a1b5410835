use super::PipelineStage;
use crate::db::ExecutionError;
use crate::llm::LlmError;
use crate::prompt::PromptError;

/// Shown to the caller when a generated query tried to modify data.
pub const REFUSAL_MESSAGE: &str = "I can't do that. I can only help you search and look up \
     information, not modify or delete it.";

/// Shown to the caller for every other failure.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An unexpected error occurred while processing your request.";

/// Everything that can stop a pipeline run.
///
/// `Display` is for logs only; callers see [`CallerOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("database schema is not available")]
    SchemaUnavailable,

    #[error("model response had an unexpected structure")]
    MalformedProviderResponse,

    #[error("model returned empty text")]
    EmptyGeneration,

    #[error("no SQL query found in model response")]
    ExtractionFailure,

    #[error("generated query contains forbidden keyword {keyword}")]
    ForbiddenOperation { keyword: &'static str },

    #[error("query execution failed")]
    ExecutionFailure(#[source] ExecutionError),

    #[error("request cancelled")]
    Cancelled,

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MalformedProviderResponse => PipelineError::MalformedProviderResponse,
            LlmError::EmptyGeneration => PipelineError::EmptyGeneration,
            other => PipelineError::Unexpected(other.to_string()),
        }
    }
}

impl From<PromptError> for PipelineError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::SchemaUnavailable => PipelineError::SchemaUnavailable,
            other @ PromptError::ResultSerialization(_) => PipelineError::Unexpected(other.to_string()),
        }
    }
}

impl From<ExecutionError> for PipelineError {
    fn from(err: ExecutionError) -> Self {
        PipelineError::ExecutionFailure(err)
    }
}

/// What the caller is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerOutcome {
    Refused,
    InternalError,
}

impl CallerOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            CallerOutcome::Refused => REFUSAL_MESSAGE,
            CallerOutcome::InternalError => GENERIC_FAILURE_MESSAGE,
        }
    }
}

/// A pipeline error together with the stage it interrupted.
#[derive(Debug, thiserror::Error)]
#[error("pipeline stopped while {stage}: {error}")]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    #[source]
    pub error: PipelineError,
}

impl PipelineFailure {
    /// `stage` is the working stage that was interrupted, never a terminal one.
    pub fn new(stage: PipelineStage, error: PipelineError) -> Self {
        debug_assert!(!stage.is_terminal(), "failure recorded at terminal stage {}", stage);
        Self { stage, error }
    }

    /// `Rejected` for safety refusals, `Failed` for everything else.
    pub fn terminal_stage(&self) -> PipelineStage {
        match self.error {
            PipelineError::ForbiddenOperation { .. } => PipelineStage::Rejected,
            _ => PipelineStage::Failed,
        }
    }

    pub fn caller_outcome(&self) -> CallerOutcome {
        match self.terminal_stage() {
            PipelineStage::Rejected => CallerOutcome::Refused,
            _ => CallerOutcome::InternalError,
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.terminal_stage() == PipelineStage::Rejected
    }
}
