//! Response DTOs for operations.

use cmdgen_core::RunReport;
use serde::{Deserialize, Serialize};

/// Console style applied to the checklist details.
pub const SUCCESS_STYLE: &str = "color: #73dd8e;font-weight: bold";

/// Message returned after a run completed without asking anything.
pub fn success_message(command: &str) -> String {
    format!("Wasn't easy, but command {} should work now!", command)
}

/// Message returned after a suspended run was resumed.
pub const RESUMED_MESSAGE: &str = "You're the boss";

/// Human-facing result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookResponse {
    /// Headline for the user.
    pub message: String,

    /// Rendered checklist: written/skipped files and elapsed time.
    pub details: String,

    /// Console style for `details`.
    pub style: String,

    /// Structured report the details were rendered from.
    pub report: RunReport,
}

impl HookResponse {
    /// Build a success response from a finished report.
    pub fn success(message: impl Into<String>, report: RunReport) -> Self {
        Self {
            message: message.into(),
            details: report.render(),
            style: SUCCESS_STYLE.to_string(),
            report,
        }
    }
}
