//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use causa_completion::CompletionConfig;
//! use causa_server::handler::routes;
//! use causa_server::service::{ServiceConfig, ServiceState};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::new(CompletionConfig::new("sk-live-key"));
//! let state = ServiceState::from_config(&config)?;
//! let router = routes(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod document_analysis;
mod error;
mod legal_search;
mod monitors;
mod request;
mod response;
mod transcript_summary;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{
    DocumentAnalysisRequest, LegalSearchRequest, TranscriptSummaryRequest,
};
pub use crate::handler::response::{
    DocumentAnalysisResponse, ErrorResponse, LegalSearchResponse, MonitorStatusResponse,
    TranscriptSummaryResponse,
};
use crate::middleware::RouterExt;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes, middleware and state applied.
pub fn routes(state: ServiceState) -> Router {
    let max_body_size = state.max_body_size();

    Router::new()
        .merge(legal_search::routes())
        .merge(document_analysis::routes())
        .merge(transcript_summary::routes())
        .merge(monitors::routes())
        .fallback(handler)
        .with_recovery_layer(max_body_size)
        .with_observability_layer()
        .with_state(state)
}
