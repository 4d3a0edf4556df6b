//! HTTP hook service for cmdgen.
//!
//! Modeling tools call the hook whenever a command node changes. Runs that
//! need an overwrite decision are parked and resumed by a follow-up call.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check with the number of parked runs
//! - `POST /api/hooks/command` - Run the pipeline for a node; replies with
//!   `{"type": "info", ...}` or `{"type": "question", "run_id", "question"}`
//! - `POST /api/question` - Answer a parked run (`{"run_id", "answer"}`)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cmdgen_api::{create_app, create_api_state};
//! use cmdgen_ops::{Config, OpsContext};
//!
//! let ctx = OpsContext::new(Config::default());
//! let router = create_app(create_api_state(ctx));
//! ```

mod routes;
mod types;

pub use routes::{create_api_router, create_app};
pub use types::{ApiResponse, ApiState, HealthResponse, HookReply, OpsErrorResponse, QuestionAnswer};

use std::sync::Arc;

use cmdgen_ops::OpsContext;

/// Create a new API state around an operations context.
pub fn create_api_state(ctx: OpsContext) -> Arc<ApiState> {
    Arc::new(ApiState::new(ctx))
}
