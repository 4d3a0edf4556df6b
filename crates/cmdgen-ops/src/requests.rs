//! Request DTOs for operations.
//!
//! Shared by the CLI and the hook service so both trigger runs the same way.

use cmdgen_core::BoardGraph;
use serde::{Deserialize, Serialize};

/// Request to generate the artifacts of one command node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Board snapshot the node lives on.
    pub board: BoardGraph,

    /// Id or name of the command node.
    pub node: String,
}

impl CommandRequest {
    /// Create a request for `node` on `board`.
    pub fn new(board: BoardGraph, node: impl Into<String>) -> Self {
        Self {
            board,
            node: node.into(),
        }
    }
}
