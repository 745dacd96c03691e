//! Document analysis handler.

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use causa_completion::CompletionClient;

use super::request::DocumentAnalysisRequest;
use super::response::DocumentAnalysisResponse;
use crate::extract::{Json, ValidateJson};
use crate::handler::{Error, Result};
use crate::service::ServiceState;

/// Tracing target for document analysis operations.
const TRACING_TARGET: &str = "causa_server::handler::document_analysis";

/// Summarises a document and lists its key points.
#[tracing::instrument(skip_all)]
async fn document_analysis(
    State(completion): State<CompletionClient>,
    ValidateJson(request): ValidateJson<DocumentAnalysisRequest>,
) -> Result<Json<DocumentAnalysisResponse>> {
    tracing::debug!(
        target: TRACING_TARGET,
        text_len = request.text.len(),
        has_instructions = request.instructions.is_some(),
        "Document analysis requested"
    );

    let typed = completion
        .run_prompt(request.into_prompt())
        .await
        .map_err(|e| Error::from(e).with_resource("document_analysis"))?
        .map_err(|e| Error::from(e).with_resource("document_analysis"))?;

    tracing::info!(
        target: TRACING_TARGET,
        key_points = typed.data.pontos_chave.len(),
        elapsed_ms = typed.completion.elapsed.as_millis(),
        "Document analysis completed"
    );

    Ok(Json(DocumentAnalysisResponse {
        analysis: typed.data,
    }))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/document-analysis", post(document_analysis))
}
