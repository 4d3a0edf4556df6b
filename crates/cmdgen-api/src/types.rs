//! API types and DTOs.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use cmdgen_ops::{HookResponse, OpsContext, PendingConflict};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Shared application state for the API.
pub struct ApiState {
    /// The operations context runs are started from.
    pub ctx: OpsContext,
    /// Runs suspended on an overwrite question, keyed by run id.
    pub pending: Mutex<HashMap<Uuid, PendingConflict>>,
}

impl ApiState {
    /// Create state with no parked runs.
    pub fn new(ctx: OpsContext) -> Self {
        Self {
            ctx,
            pending: Mutex::new(HashMap::new()),
        }
    }
}

/// Response wrapper with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data.
    pub data: T,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl<T> ApiResponse<T> {
    /// Create a new API response with current timestamp.
    pub fn new(data: T) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { data, timestamp }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Number of runs waiting for an answer.
    pub pending: usize,
}

/// What the modeling tool should show after a hook call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HookReply {
    /// The run finished.
    Info {
        message: String,
        details: String,
        style: String,
    },
    /// The run is suspended; answer via `POST /api/question`.
    Question { run_id: Uuid, question: String },
}

impl From<HookResponse> for HookReply {
    fn from(response: HookResponse) -> Self {
        HookReply::Info {
            message: response.message,
            details: response.details,
            style: response.style,
        }
    }
}

/// Answer to a pending overwrite question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnswer {
    /// Run id handed out with the question.
    pub run_id: Uuid,
    /// Free-form answer, e.g. `yes` or `no`.
    pub answer: String,
}

/// Error response for operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsErrorResponse {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Checklist of what was written before the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
}
