//! Request/response bodies for the HTTP API

use serde::{Deserialize, Serialize};

/// Body of `POST /human-query`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AskRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl AskRequest {
    /// The trimmed prompt, or `None` when missing or blank.
    pub fn question(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// Error body, shaped like the error responses existing clients expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub schema_loaded: bool,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_trims_and_rejects_blank() {
        let req: AskRequest = serde_json::from_str(r#"{"prompt": "  hi  "}"#).unwrap();
        assert_eq!(req.question(), Some("hi"));

        let req: AskRequest = serde_json::from_str(r#"{"prompt": "   "}"#).unwrap();
        assert_eq!(req.question(), None);

        let req: AskRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(req.question(), None);
    }

    #[test]
    fn test_error_body_is_camel_case() {
        let body = ErrorBody {
            status_code: 403,
            message: "no".to_string(),
            error: "Forbidden".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["statusCode"], 403);
    }
}
