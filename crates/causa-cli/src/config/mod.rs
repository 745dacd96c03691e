//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── serve   ServerConfig + ServiceConfig
//! ├── search  <query> [--deep] + ServiceConfig
//! └── check   ServiceConfig
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.

mod server;

use std::process;

use anyhow::Context;
use causa_server::service::ServiceConfig;
use clap::{Parser, Subcommand};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "causa")]
#[command(about = "Structured LLM completions for Brazilian legal research")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the HTTP API.
    Serve {
        #[command(flatten)]
        server: ServerConfig,

        #[command(flatten)]
        service: ServiceConfig,
    },

    /// Run one jurisprudence search and print the results as JSON.
    Search {
        /// Free-text search query.
        query: String,

        /// Use the slower search that returns more results.
        #[arg(long)]
        deep: bool,

        #[command(flatten)]
        service: ServiceConfig,
    },

    /// Validate configuration without calling the completion endpoint.
    Check {
        #[command(flatten)]
        service: ServiceConfig,
    },
}

impl Command {
    /// Returns the service configuration shared by every command.
    pub fn service(&self) -> &ServiceConfig {
        match self {
            Self::Serve { service, .. } | Self::Search { service, .. } | Self::Check { service } => {
                service
            }
        }
    }
}

impl Cli {
    /// Loads the .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Command::Serve { server, .. } = &self.command {
            server.validate().context("invalid server configuration")?;
        }

        self.command
            .service()
            .validate()
            .context("invalid service configuration")?;

        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        if let Command::Serve { server, .. } = &self.command {
            server.log();
        }

        let service = self.command.service();
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            llm_base_url = %service.completion.llm_base_url,
            llm_model = %service.completion.llm_model,
            llm_api_key_set = service.completion.is_configured(),
            max_body_size = service.max_body_size,
            "Service configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
