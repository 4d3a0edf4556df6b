//! The command generation pipeline.
//!
//! A run resolves the node, generates and writes the schema, then generates
//! and writes the API description and command file. If the schema file
//! already exists the run suspends: it hands back a [`PendingConflict`] and
//! everything after the schema write happens only once that is answered.
//!
//! ```text
//! Start → Resolved → SchemaGenerated ─┬─ no conflict ─→ RemainderGenerated → Written → Done
//!                                     └─ conflict ─→ AwaitingAnswer ──answer──┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use cmdgen_core::{
    AnalysisSnapshot, ArtifactDescriptor, ArtifactKind, Connection, ModelNode, RunReport,
};
use tracing::{debug, info};

use crate::analyzer::ConnectionResolver;
use crate::config::Config;
use crate::error::{OpsError, OpsResult};
use crate::gate::{check_conflict, Verdict};
use crate::generator::ArtifactGenerator;
use crate::responses::{success_message, HookResponse, RESUMED_MESSAGE};
use crate::writer::{ArtifactWriter, WriteExecutor};

// =============================================================================
// Clock
// =============================================================================

/// Monotonic time source for elapsed-time reporting.
pub trait Clock: Send + Sync {
    /// Time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

// =============================================================================
// Outcomes
// =============================================================================

type Resume = Box<dyn FnOnce(bool) -> OpsResult<HookResponse> + Send>;

/// A run suspended on the overwrite question for an existing schema file.
///
/// Holds everything needed to finish the run. Answering consumes it, so a
/// suspended run resumes at most once; dropping it abandons the run.
pub struct PendingConflict {
    descriptor: ArtifactDescriptor,
    question: String,
    resume: Resume,
}

impl PendingConflict {
    /// The question to put to the user.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// The schema artifact awaiting the decision.
    pub fn descriptor(&self) -> &ArtifactDescriptor {
        &self.descriptor
    }

    /// Resume the run: write the schema if `overwrite`, skip it otherwise,
    /// then generate and write the remaining artifacts.
    pub fn answer(self, overwrite: bool) -> OpsResult<HookResponse> {
        info!(
            path = %self.descriptor.path().display(),
            overwrite,
            "Resuming run"
        );
        (self.resume)(overwrite)
    }
}

impl std::fmt::Debug for PendingConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingConflict")
            .field("descriptor", &self.descriptor.target_path)
            .field("question", &self.question)
            .finish_non_exhaustive()
    }
}

/// Result of starting a run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The run finished in one go.
    Completed(HookResponse),
    /// The run is waiting for an overwrite decision.
    AwaitingAnswer(PendingConflict),
}

impl RunOutcome {
    /// The response, if the run completed.
    pub fn completed(self) -> Option<HookResponse> {
        match self {
            RunOutcome::Completed(response) => Some(response),
            RunOutcome::AwaitingAnswer(_) => None,
        }
    }

    /// The pending question, if the run suspended.
    pub fn pending(self) -> Option<PendingConflict> {
        match self {
            RunOutcome::AwaitingAnswer(pending) => Some(pending),
            RunOutcome::Completed(_) => None,
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Sequences resolution, generation, the conflict gate and writes for one node.
#[derive(Clone)]
pub struct CommandPipeline {
    config: Config,
    resolver: Arc<dyn ConnectionResolver>,
    generator: Arc<dyn ArtifactGenerator>,
    executor: WriteExecutor,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CommandPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CommandPipeline {
    /// Create a pipeline writing to the filesystem and timing with the system clock.
    pub fn new(
        config: Config,
        resolver: Arc<dyn ConnectionResolver>,
        generator: Arc<dyn ArtifactGenerator>,
    ) -> Self {
        Self {
            config,
            resolver,
            generator,
            executor: WriteExecutor::default(),
            clock: Arc::new(SystemClock::default()),
        }
    }

    /// Replace the artifact writer.
    pub fn with_writer(mut self, writer: Arc<dyn ArtifactWriter>) -> Self {
        self.executor = WriteExecutor::new(writer);
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the pipeline for `node`.
    pub fn run(&self, node: &ModelNode) -> OpsResult<RunOutcome> {
        let started = self.clock.now();
        let mut report = RunReport::new();

        let (connection, snapshot) = self.resolver.resolve(node)?;

        let schema = self.generate_schema(&connection, &snapshot)?;
        let schema_ref = schema
            .as_ref()
            .map(|s| self.config.relative_to_base(s.path()));

        if let Some(descriptor) = schema {
            if let Verdict::Conflict { question } = check_conflict(&descriptor) {
                info!(
                    node = %connection.node.name,
                    path = %descriptor.path().display(),
                    "Schema file exists, awaiting overwrite decision"
                );

                let pipeline = self.clone();
                let target = descriptor.clone();
                let resume = move |overwrite: bool| {
                    let mut report = report;
                    if overwrite {
                        pipeline.executor.write(&target, &mut report)?;
                    } else {
                        report.record_skipped();
                    }
                    pipeline.finish(
                        &connection,
                        &snapshot,
                        schema_ref.as_deref(),
                        report,
                        started,
                        RESUMED_MESSAGE.to_string(),
                    )
                };

                return Ok(RunOutcome::AwaitingAnswer(PendingConflict {
                    descriptor,
                    question,
                    resume: Box::new(resume),
                }));
            }

            self.executor.write(&descriptor, &mut report)?;
        }

        let message = success_message(&connection.node.name);
        let response = self.finish(
            &connection,
            &snapshot,
            schema_ref.as_deref(),
            report,
            started,
            message,
        )?;
        Ok(RunOutcome::Completed(response))
    }

    fn generate_schema(
        &self,
        connection: &Connection,
        snapshot: &AnalysisSnapshot,
    ) -> OpsResult<Option<ArtifactDescriptor>> {
        let mut schemas =
            self.generator
                .generate_schema(connection, snapshot, &self.config.schema_root())?;

        if schemas.len() > 1 {
            return Err(OpsError::generation(
                ArtifactKind::Schema,
                format!("expected at most one schema file, got {}", schemas.len()),
            ));
        }

        debug!(
            node = %connection.node.name,
            generated = schemas.len(),
            "Generated schema"
        );
        Ok(schemas.pop())
    }

    fn finish(
        &self,
        connection: &Connection,
        snapshot: &AnalysisSnapshot,
        schema_ref: Option<&str>,
        mut report: RunReport,
        started: Duration,
        message: String,
    ) -> OpsResult<HookResponse> {
        let files = self
            .generator
            .generate_remainder(connection, snapshot, schema_ref)?;
        debug!(node = %connection.node.name, files = files.len(), "Generated remainder");

        self.executor.write_all(&files, &mut report)?;

        let elapsed = self.clock.now().saturating_sub(started);
        report.finish(elapsed);

        info!(
            node = %connection.node.name,
            entries = report.lines().len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Run completed"
        );
        Ok(HookResponse::success(message, report))
    }
}
