//! Transcript summary handler.

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use causa_completion::CompletionClient;

use super::request::TranscriptSummaryRequest;
use super::response::TranscriptSummaryResponse;
use crate::extract::{Json, ValidateJson};
use crate::handler::{Error, Result};
use crate::service::ServiceState;

const TRACING_TARGET: &str = "causa_server::handler::transcript_summary";

#[tracing::instrument(skip_all)]
async fn transcript_summary(
    State(completion): State<CompletionClient>,
    ValidateJson(request): ValidateJson<TranscriptSummaryRequest>,
) -> Result<Json<TranscriptSummaryResponse>> {
    tracing::debug!(
        target: TRACING_TARGET,
        transcript_len = request.transcript.len(),
        "Transcript summary requested"
    );

    let typed = completion
        .run_prompt(request.into_prompt())
        .await
        .map_err(|e| Error::from(e).with_resource("transcript_summary"))?
        .map_err(|e| Error::from(e).with_resource("transcript_summary"))?;

    tracing::info!(
        target: TRACING_TARGET,
        topics = typed.data.topicos.len(),
        elapsed_ms = typed.completion.elapsed.as_millis(),
        "Transcript summary completed"
    );

    Ok(Json(TranscriptSummaryResponse {
        summary: typed.data,
    }))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/api/transcript-summary", post(transcript_summary))
}
