//! Jurisprudence search handler.

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use causa_completion::CompletionClient;

use super::request::LegalSearchRequest;
use super::response::LegalSearchResponse;
use crate::extract::{Json, ValidateJson};
use crate::handler::{Error, Result};
use crate::service::ServiceState;

/// Tracing target for search operations.
const TRACING_TARGET: &str = "causa_server::handler::legal_search";

/// Searches case law for a free-text query.
#[tracing::instrument(skip_all)]
async fn legal_search(
    State(completion): State<CompletionClient>,
    ValidateJson(request): ValidateJson<LegalSearchRequest>,
) -> Result<Json<LegalSearchResponse>> {
    let mode = request.mode;

    tracing::debug!(
        target: TRACING_TARGET,
        mode = %mode,
        query_len = request.query.len(),
        "Legal search requested"
    );

    let typed = completion
        .run_prompt(request.into_prompt())
        .await
        .map_err(|e| Error::from(e).with_resource("legal_search"))?
        .map_err(|e| Error::from(e).with_resource("legal_search"))?;

    tracing::info!(
        target: TRACING_TARGET,
        mode = %mode,
        results = typed.data.results.len(),
        elapsed_ms = typed.completion.elapsed.as_millis(),
        "Legal search completed"
    );

    Ok(Json(LegalSearchResponse::new(typed.data, mode)))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/legal-search", post(legal_search))
}
