//! HTTP handlers

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::types::{AskRequest, ErrorBody, StatusResponse};
use super::AppState;
use crate::pipeline::{CallerOutcome, PipelineFailure};
use crate::schema::SchemaColumnInfo;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Answer a natural-language question
pub async fn ask_handler(State(state): State<AppState>, Json(body): Json<AskRequest>) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let Some(question) = body.question() else {
        let response = error_response(StatusCode::BAD_REQUEST, "Prompt is required");
        return with_request_id(response, &request_id);
    };

    let span = tracing::info_span!("ask", request_id = %request_id);
    let response = answer(&state, question).instrument(span).await;
    with_request_id(response, &request_id)
}

async fn answer(state: &AppState, question: &str) -> Response {
    // Dropping this handler (client gone) cancels the token through the guard
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    spawn_deadline(cancel.clone(), state.request_timeout);

    match state.pipeline.ask(question, &cancel).await {
        Ok(answer) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            answer,
        )
            .into_response(),
        Err(failure) => failure_response(&failure),
    }
}

/// Cancel `cancel` after `timeout` unless it is cancelled first.
fn spawn_deadline(cancel: CancellationToken, timeout: Duration) {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!("Request deadline of {:?} exceeded", timeout);
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    });
}

fn failure_response(failure: &PipelineFailure) -> Response {
    let outcome = failure.caller_outcome();
    let status = match outcome {
        CallerOutcome::Refused => StatusCode::FORBIDDEN,
        CallerOutcome::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, outcome.message())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        message: message.to_string(),
        error: status.canonical_reason().unwrap_or("Error").to_string(),
    };
    (status, Json(body)).into_response()
}

fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Raw introspected columns, as loaded at startup
pub async fn schema_handler(State(state): State<AppState>) -> Json<Vec<SchemaColumnInfo>> {
    let snapshot = state.pipeline.schema().snapshot();
    Json(snapshot.columns.clone())
}

/// Health check and status endpoint
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        schema_loaded: state.pipeline.schema().is_loaded(),
        model: state.pipeline.model().to_string(),
    })
}
