#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::{Context, anyhow};
use causa_completion::prompt::{LegalSearchPrompt, SearchMode};
use causa_server::handler::routes;
use causa_server::service::{ServiceConfig, ServiceState};

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "causa_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "causa_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "causa_cli::config";
pub const TRACING_TARGET_SEARCH: &str = "causa_cli::search";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    match cli.command {
        Command::Serve { server, service } => {
            let state = ServiceState::from_config(&service)
                .context("failed to create service state")?;
            server::serve(routes(state), server).await?;
        }
        Command::Search {
            query,
            deep,
            service,
        } => search(&service, query, deep).await?,
        Command::Check { service } => check(&service).await?,
    }

    Ok(())
}

/// Runs one search and prints the results to stdout.
async fn search(config: &ServiceConfig, query: String, deep: bool) -> anyhow::Result<()> {
    let client = config
        .connect_completion()
        .context("failed to create completion client")?;
    let mode = if deep { SearchMode::Deep } else { SearchMode::Quick };

    let typed = client
        .run_prompt(LegalSearchPrompt::new(query).with_mode(mode))
        .await
        .context("invalid search")?
        .map_err(|failure| anyhow!("search failed ({}): {failure}", failure.kind()))?;

    tracing::info!(
        target: TRACING_TARGET_SEARCH,
        mode = %mode,
        results = typed.data.results.len(),
        elapsed_ms = typed.completion.elapsed.as_millis(),
        "Search completed"
    );

    let output = serde_json::to_string_pretty(&typed.data).context("failed to encode results")?;
    println!("{output}");
    Ok(())
}

/// Validates configuration, builds the client and prints its health report.
///
/// Nothing is sent to the endpoint.
async fn check(config: &ServiceConfig) -> anyhow::Result<()> {
    let client = config
        .connect_completion()
        .context("failed to create completion client")?;
    let health = client.health_check().await;

    let output = serde_json::to_string_pretty(&health).context("failed to encode health")?;
    println!("{output}");
    Ok(())
}
