//! OpsContext - The main service for executing operations.
//!
//! The OpsContext holds configuration plus the writer and clock runs use, and
//! wires the built-in resolver and generator for each request. It can be used
//! by the CLI, the hook service, or any other consumer.

use std::path::Path;
use std::sync::Arc;

use cmdgen_core::BoardGraph;
use tracing::{debug, info};

use crate::analyzer::BoardAnalyzer;
use crate::config::Config;
use crate::error::{OpsError, OpsResult};
use crate::generator::CommandGenerator;
use crate::pipeline::{Clock, CommandPipeline, RunOutcome, SystemClock};
use crate::requests::CommandRequest;
use crate::writer::{ArtifactWriter, FsWriter};

/// The main operations context.
///
/// Cheap to clone and can be shared across async tasks.
#[derive(Clone)]
pub struct OpsContext {
    /// Configuration for operations.
    pub config: Config,
    writer: Arc<dyn ArtifactWriter>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for OpsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpsContext {
    /// Create a new OpsContext with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            writer: Arc::new(FsWriter),
            clock: Arc::new(SystemClock::default()),
        }
    }

    /// Create a new OpsContext with configuration loaded from disk and env.
    pub fn default_config() -> OpsResult<Self> {
        Ok(Self::new(Config::load()?))
    }

    /// Replace the artifact writer used by runs.
    pub fn with_writer(mut self, writer: Arc<dyn ArtifactWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Replace the clock used by runs.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // =========================================================================
    // Board Operations
    // =========================================================================

    /// Load a board snapshot from a JSON file.
    pub fn load_board(&self, path: &Path) -> OpsResult<BoardGraph> {
        let contents = std::fs::read_to_string(path).map_err(|e| OpsError::Board {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let board: BoardGraph = serde_json::from_str(&contents).map_err(|e| OpsError::Board {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(
            path = %path.display(),
            nodes = board.node_count(),
            edges = board.edge_count(),
            "Loaded board"
        );
        Ok(board)
    }

    /// Build the pipeline for a board with the built-in resolver and generator.
    pub fn pipeline(&self, board: &BoardGraph) -> CommandPipeline {
        CommandPipeline::new(
            self.config.clone(),
            Arc::new(BoardAnalyzer::new(board)),
            Arc::new(CommandGenerator::new(self.config.clone())),
        )
        .with_writer(self.writer.clone())
        .with_clock(self.clock.clone())
    }

    // =========================================================================
    // Command Operations
    // =========================================================================

    /// Generate the artifacts of a command node.
    ///
    /// Returns [`RunOutcome::AwaitingAnswer`] when the schema file already
    /// exists; the caller owns the pending question from then on.
    pub async fn generate_command(&self, request: CommandRequest) -> OpsResult<RunOutcome> {
        self.config.validate()?;

        let node = request
            .board
            .find(&request.node)
            .ok_or_else(|| OpsError::resolution(&request.node, "no such node on the board"))?
            .clone();

        info!(node = %node.name, id = %node.id, "Generating command artifacts");
        self.pipeline(&request.board).run(&node)
    }
}
