//! Workspace routes — the unified QA-generation endpoint.
//!
//! One POST endpoint covers all seven workflows; which one runs is
//! derived from which request fields are populated, never from an
//! explicit mode flag.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use docqa_core::{Error, QueryType, WorkflowContext};
use docqa_workflow::{detect_workflow, WorkspaceExecutor};

use crate::review_log::ReviewEntry;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workspace/unified", post(unified))
        .route("/workspace/evaluate", post(evaluate))
        .route("/workspace/health", get(health))
}

#[derive(Debug, Deserialize)]
pub struct UnifiedRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub ocr_text: String,
    #[serde(default = "default_query_type")]
    pub query_type: String,
    #[serde(default)]
    pub edit_request: Option<String>,
    #[serde(default)]
    pub global_explanation_ref: Option<String>,
    #[serde(default)]
    pub use_lats: bool,
    #[serde(default)]
    pub inspector_comment: Option<String>,
}

fn default_query_type() -> String {
    "explanation".into()
}

/// POST /api/workspace/unified — classify and run one workflow.
async fn unified(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UnifiedRequest>,
) -> (StatusCode, Json<Value>) {
    let request_id = Uuid::new_v4().to_string();

    if req.ocr_text.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "ocr_text가 비어 있습니다",
            &request_id,
        );
    }

    let query_type = match QueryType::parse(&req.query_type) {
        Some(qt) => qt,
        None => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("알 수 없는 query_type: {}", req.query_type),
                &request_id,
            );
        }
    };

    let workflow = detect_workflow(
        req.query.as_deref(),
        req.answer.as_deref(),
        req.edit_request.as_deref(),
    );
    info!(
        "Request {}: workflow {}, query_type {}",
        request_id,
        workflow.as_str(),
        query_type.as_str()
    );

    let ctx = WorkflowContext {
        query: req.query.clone(),
        answer: req.answer.clone(),
        ocr_text: req.ocr_text.clone(),
        query_type,
        edit_request: req.edit_request.clone(),
        global_explanation_ref: req.global_explanation_ref.clone(),
        use_lats: req.use_lats,
    };

    let executor = WorkspaceExecutor::new(&state.llm, state.graph.as_ref());
    let deadline = Duration::from_secs(state.config.request_timeout_secs);

    let result = match tokio::time::timeout(deadline, executor.execute(workflow, &ctx)).await {
        Err(_) => {
            let err = Error::Timeout(state.config.request_timeout_secs);
            error!("Request {}: {}", request_id, err);
            return error_response(
                StatusCode::GATEWAY_TIMEOUT,
                "처리 시간이 초과되었습니다. 잠시 후 다시 시도해 주세요",
                &request_id,
            );
        }
        Ok(Err(Error::Validation(message))) => {
            return error_response(StatusCode::BAD_REQUEST, message, &request_id);
        }
        Ok(Err(e)) => {
            // Internal detail stays server-side; the client gets a
            // generic failure.
            error!("Request {} failed: {}", request_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "실행에 실패했습니다",
                &request_id,
            );
        }
        Ok(Ok(result)) => result,
    };

    state.review_log.append(&ReviewEntry {
        timestamp: Utc::now().to_rfc3339(),
        mode: result.workflow.as_str(),
        question: &result.query,
        answer_before: req.answer.as_deref().unwrap_or(""),
        answer_after: &result.answer,
        edit_request_used: req.edit_request.as_deref(),
        inspector_comment: req.inspector_comment.as_deref(),
    });

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": result,
            "metadata": {
                "request_id": request_id,
                "workflow": result.workflow.as_str(),
                "query_type": query_type.as_str(),
                "timestamp": Utc::now().to_rfc3339(),
            },
            "errors": [],
        })),
    )
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub question: String,
    pub answers: Vec<String>,
}

/// POST /api/workspace/evaluate — LLM-judged comparison of candidate
/// answers, used by the inspector review surface.
async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> (StatusCode, Json<Value>) {
    let request_id = Uuid::new_v4().to_string();

    if req.answers.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "answers가 비어 있습니다",
            &request_id,
        );
    }

    match docqa_llm::evaluate_answers(&state.llm, &req.question, &req.answers).await {
        Ok(evaluation) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": evaluation,
                "metadata": {
                    "request_id": request_id,
                    "timestamp": Utc::now().to_rfc3339(),
                },
                "errors": [],
            })),
        ),
        Err(e) => {
            error!("Request {} evaluation failed: {}", request_id, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "평가에 실패했습니다",
                &request_id,
            )
        }
    }
}

/// GET /api/workspace/health — liveness and collaborator status.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "graph_enabled": state.graph.is_some(),
        "models": state.config.gemini_models,
    }))
}

fn error_response(
    status: StatusCode,
    message: impl Into<String>,
    request_id: &str,
) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "success": false,
            "data": Value::Null,
            "metadata": {
                "request_id": request_id,
                "timestamp": Utc::now().to_rfc3339(),
            },
            "errors": [message.into()],
        })),
    )
}
