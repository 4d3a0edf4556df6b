//! Generate command implementation.
//!
//! Runs the pipeline for one command node. An existing schema file is only
//! overwritten when `--overwrite` is given or the prompt is answered yes.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use cmdgen_ops::{parse_answer, CommandRequest, Config, HookResponse, OpsContext, RunOutcome};
use tracing::debug;

/// Execute the generate command.
///
/// `decision` answers the overwrite question up front; `None` prompts on stdin.
pub async fn execute(
    config: Config,
    board_path: &Path,
    node: &str,
    decision: Option<bool>,
) -> Result<()> {
    let ctx = OpsContext::new(config);
    let board = ctx.load_board(board_path)?;

    println!("⚙️  Generating {} from {}", node, board_path.display());

    let outcome = ctx.generate_command(CommandRequest::new(board, node)).await;
    let result = match outcome {
        Ok(RunOutcome::Completed(response)) => Ok(response),
        Ok(RunOutcome::AwaitingAnswer(pending)) => {
            let overwrite = match decision {
                Some(overwrite) => overwrite,
                None => prompt(pending.question())?,
            };
            debug!(overwrite, "Overwrite decision");
            pending.answer(overwrite)
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            print_response(&response);
            Ok(())
        }
        Err(e) => {
            if let Some(report) = e.partial_report() {
                eprint!("{}", report);
            }
            Err(e.into())
        }
    }
}

/// Ask a yes/no question on the terminal. Anything but a yes keeps the file.
fn prompt(question: &str) -> Result<bool> {
    print!("❓ {} [y/N] ", question);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read answer")?;

    Ok(parse_answer(&line))
}

fn print_response(response: &HookResponse) {
    println!();
    println!("✅ {}", response.message);
    println!();
    print!("{}", response.details);
}
