//! cmdgen CLI - generate command artifacts from a modeling board.
//!
//! Turns a command node into its JSON schema, API description and command
//! file, asking before it overwrites an existing schema.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;

use commands::{config as config_cmd, generate, serve};

/// cmdgen CLI - Generate command artifacts from a modeling board.
#[derive(Parser, Debug)]
#[command(
    name = "cmdgen",
    author,
    version,
    about = "cmdgen: Generate command schemas, API descriptions and command files",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "CMDGEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the artifacts of a command node.
    Generate {
        /// Id or name of the command node.
        node: String,

        /// Board snapshot (JSON) the node lives on.
        #[arg(short, long)]
        board: PathBuf,

        /// Overwrite an existing schema file without asking.
        #[arg(long, conflicts_with = "keep")]
        overwrite: bool,

        /// Keep an existing schema file without asking.
        #[arg(long)]
        keep: bool,
    },

    /// Run the HTTP hook service.
    Serve {
        /// Address to listen on (defaults to the configured one).
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Manage configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN // Default to less noise
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.or_else(cmdgen_ops::Config::config_file_path);
    let config = cmdgen_ops::Config::load_from(config_path.as_deref())?;

    match cli.command {
        Commands::Generate {
            node,
            board,
            overwrite,
            keep,
        } => {
            let decision = if overwrite {
                Some(true)
            } else if keep {
                Some(false)
            } else {
                None
            };
            generate::execute(config, &board, &node, decision).await?;
        }

        Commands::Serve { listen } => {
            serve::execute(config, listen).await?;
        }

        Commands::Config(config_cmd_inner) => {
            let path = config_path.as_deref();
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config, path)?;
                }
                ConfigCommands::Set { key, value } => {
                    // Edit the stored file, not the env-overridden view
                    let mut stored = cmdgen_ops::Config::load_file(path)?;
                    config_cmd::set(&mut stored, path, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset(path)?;
                }
                ConfigCommands::Path => match path {
                    Some(path) => println!("{}", path.display()),
                    None => println!("(no config file path available)"),
                },
            }
        }
    }

    Ok(())
}
