// Allow common clippy pedantic lints
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]

//! EventDesk CLI
//!
//! Command-line client for the event booking API

use clap::Parser;
use eventdesk_client::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
