use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use vidhi_core::types::{ChatRequest, CompletionRequest, ErrorBody};

use crate::AppState;

pub const MISSING_HISTORY: &str = "Conversation history is required.";
pub const BAD_BODY: &str = "Request body must be a JSON object.";
pub const GENERIC_FAILURE: &str = "An internal server error occurred.";

// ── Error type ────────────────────────────────────────────────────────────

/// Client-visible failures of `/api/chat`. Only 400s carry a specific
/// message; everything else collapses to [`GENERIC_FAILURE`].
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("conversation history is missing")]
    MissingHistory,
    #[error("malformed request body: {0}")]
    BadBody(String),
    #[error("GEMINI_API_KEY is not configured")]
    NotConfigured,
    #[error("upstream call failed: {0:#}")]
    Upstream(#[from] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingHistory | RelayError::BadBody(_) => StatusCode::BAD_REQUEST,
            RelayError::NotConfigured | RelayError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            RelayError::MissingHistory => MISSING_HISTORY,
            RelayError::BadBody(_) => BAD_BODY,
            RelayError::NotConfigured | RelayError::Upstream(_) => GENERIC_FAILURE,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("chat relay error: {self}");
        } else {
            warn!("rejected chat request: {self}");
        }
        let body = ErrorBody {
            error: self.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_s": state.start_time.elapsed().as_secs(),
    }))
}

/// `POST /api/chat`: forward the client's history upstream and return the
/// service's response unchanged.
pub(crate) async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(body) = payload.map_err(|e| RelayError::BadBody(e.body_text()))?;

    let history = body
        .history
        .filter(|h| !h.is_null())
        .ok_or(RelayError::MissingHistory)?;

    let backend = state.backend.as_ref().ok_or(RelayError::NotConfigured)?;

    let mut request = CompletionRequest::new(history);
    if let Some(schema) = body.response_schema {
        request = request.with_response_schema(schema);
    }

    info!(
        turns = request.contents.as_array().map_or(0, Vec::len),
        structured = request.response_schema.is_some(),
        "relaying chat request"
    );

    let response = backend.generate_content(&request).await?;
    Ok(Json(response))
}
