//! Model client adapter
//!
//! [`TextGenerator`] is the seam between the pipeline and a language
//! model provider. One call sends one prompt and returns the text of the
//! first part of the first candidate. Retries are left to callers.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider request failed: {0}")]
    Transport(reqwest::Error),

    #[error("provider returned status {status}")]
    Api { status: u16 },

    #[error("provider response missing candidates/content/parts/text")]
    MalformedProviderResponse,

    #[error("provider returned empty text")]
    EmptyGeneration,
}

// Request URLs may carry credentials; keep them out of error text.
impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Transport(err.without_url())
    }
}

/// Single-turn text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Send `prompt` to `model` and return the generated text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}
