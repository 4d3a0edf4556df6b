//! Serve command implementation.
//!
//! Runs the hook service the modeling tool calls when a command node changes.
//!
//! - `/api/health` - health check
//! - `/api/hooks/command` - run the pipeline for a node
//! - `/api/question` - answer a parked overwrite question

use std::net::SocketAddr;

use anyhow::{Context, Result};
use cmdgen_api::{create_api_state, create_app};
use cmdgen_ops::{Config, OpsContext};
use tokio::net::TcpListener;
use tracing::info;

/// Execute the serve command.
pub async fn execute(mut config: Config, listen: Option<String>) -> Result<()> {
    if let Some(listen) = listen {
        config.set("listen", &listen)?;
    }
    config.validate()?;

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen))?;

    let base_path = config.base_path.clone();
    let app = create_app(create_api_state(OpsContext::new(config)));

    // Print server info
    println!();
    println!("🚀 cmdgen hook service");
    println!("   Base: {}", base_path.display());
    println!("   Hook: http://{}/api/hooks/command", addr);
    println!("   API:  http://{}/api/health", addr);
    println!();
    println!("   Press Ctrl+C to stop");
    println!();

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Hook service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
