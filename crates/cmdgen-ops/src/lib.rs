//! cmdgen Operations Layer
//!
//! Turns a command node on a modeling board into its artifact family (a JSON
//! schema, an API description fragment and a command file), writes them and
//! reports what changed. Used by both the CLI and the hook service.
//!
//! ## Architecture
//!
//! - **Resolver**: board node → connection + analysis snapshot
//! - **Generators**: connection → path-addressed artifacts, no disk access
//! - **Conflict gate**: an existing schema file suspends the run with a question
//! - **Write executor**: persists artifacts and records each write in the report
//! - **Pipeline**: sequences the steps and owns the report and timing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cmdgen_ops::{CommandRequest, Config, OpsContext, RunOutcome};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = OpsContext::new(Config::load()?);
//!     let board = ctx.load_board("board.json".as_ref())?;
//!
//!     match ctx.generate_command(CommandRequest::new(board, "PlaceOrder")).await? {
//!         RunOutcome::Completed(response) => println!("{}", response.details),
//!         RunOutcome::AwaitingAnswer(pending) => {
//!             println!("{}", pending.question());
//!             let response = pending.answer(true)?;
//!             println!("{}", response.details);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod analyzer;
mod config;
mod context;
mod error;
mod gate;
mod generator;
mod pipeline;
mod requests;
mod responses;
mod schema;
mod writer;

// Re-export public API
pub use analyzer::{BoardAnalyzer, ConnectionResolver};
pub use config::{Config, CONFIG_KEYS};
pub use context::OpsContext;
pub use error::{OpsError, OpsResult};
pub use gate::{check_conflict, overwrite_question, parse_answer, Verdict};
pub use generator::{ArtifactGenerator, CommandGenerator};
pub use pipeline::{Clock, CommandPipeline, PendingConflict, RunOutcome, SystemClock};
pub use requests::*;
pub use responses::*;
pub use schema::expand_schema;
pub use writer::{ArtifactWriter, FsWriter, WriteExecutor};
