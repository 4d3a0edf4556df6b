//! Command hook endpoints.
//!
//! A hook call runs the pipeline for one command node. When the run suspends
//! on an existing schema file, the pending run is parked under a fresh run id
//! and the question goes back to the caller; `POST /api/question` resumes it.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cmdgen_ops::{parse_answer, CommandRequest, OpsError, RunOutcome};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::types::{ApiResponse, ApiState, HookReply, OpsErrorResponse, QuestionAnswer};

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/hooks/command - Generate the artifacts of a command node.
pub async fn command_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CommandRequest>,
) -> Response {
    info!(node = %request.node, "Command hook");

    match state.ctx.generate_command(request).await {
        Ok(RunOutcome::Completed(response)) => reply(HookReply::from(response)),
        Ok(RunOutcome::AwaitingAnswer(pending)) => {
            let run_id = Uuid::new_v4();
            let question = pending.question().to_string();
            state.pending.lock().await.insert(run_id, pending);

            info!(%run_id, "Run parked until the question is answered");
            reply(HookReply::Question { run_id, question })
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/question - Resume a parked run.
pub async fn question_handler(
    State(state): State<Arc<ApiState>>,
    Json(answer): Json<QuestionAnswer>,
) -> Response {
    // Removing under the lock makes each run resumable once
    let pending = state.pending.lock().await.remove(&answer.run_id);
    let Some(pending) = pending else {
        warn!(run_id = %answer.run_id, "Answer for unknown run");
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::new(OpsErrorResponse {
                code: "UNKNOWN_RUN".to_string(),
                message: format!("No pending question for run {}", answer.run_id),
                report: None,
            })),
        )
            .into_response();
    };

    let overwrite = parse_answer(&answer.answer);
    info!(run_id = %answer.run_id, overwrite, "Answer received");

    match pending.answer(overwrite) {
        Ok(response) => reply(HookReply::from(response)),
        Err(e) => error_response(e),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn reply(reply: HookReply) -> Response {
    (StatusCode::OK, Json(ApiResponse::new(reply))).into_response()
}

fn error_response(e: OpsError) -> Response {
    let (status, code) = match &e {
        OpsError::Resolution { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "RESOLUTION_ERROR"),
        OpsError::Generation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "GENERATION_ERROR"),
        OpsError::Board { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "BOARD_ERROR"),
        OpsError::Write { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "WRITE_ERROR"),
        OpsError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        OpsError::Io(_) | OpsError::Json(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };

    if e.is_model_error() {
        warn!("Command hook rejected: {}", e);
    } else {
        error!("Command hook failed: {}", e);
    }

    (
        status,
        Json(ApiResponse::new(OpsErrorResponse {
            code: code.to_string(),
            message: e.to_string(),
            report: e.partial_report().map(|r| r.render()),
        })),
    )
        .into_response()
}
