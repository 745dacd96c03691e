//! Application state and dependency injection.

mod config;
mod state;

pub use crate::service::config::ServiceConfig;
pub use crate::service::state::ServiceState;
