//! Listener settings for `causa serve`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Lowest port accepted without root privileges.
const UNPRIVILEGED_PORTS: RangeInclusive<u16> = 1024..=u16::MAX;

/// Accepted drain window in seconds. A deep search takes up to 30 s.
const SHUTDOWN_TIMEOUT_SECS: RangeInclusive<u64> = 1..=300;

/// Where `causa serve` listens and how long it drains on shutdown.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to listen on ("0.0.0.0" for every interface)
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds in-flight requests may run after SIGINT/SIGTERM before exit
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 35)]
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// Checks the port and drain window.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending value.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            UNPRIVILEGED_PORTS.contains(&self.port),
            "port {} needs root privileges, use {}-{}",
            self.port,
            UNPRIVILEGED_PORTS.start(),
            UNPRIVILEGED_PORTS.end()
        );
        ensure!(
            SHUTDOWN_TIMEOUT_SECS.contains(&self.shutdown_timeout),
            "shutdown timeout of {}s is outside {}-{}s",
            self.shutdown_timeout,
            SHUTDOWN_TIMEOUT_SECS.start(),
            SHUTDOWN_TIMEOUT_SECS.end()
        );
        Ok(())
    }

    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Listener configured"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            shutdown_timeout: 35,
        }
    }
}
