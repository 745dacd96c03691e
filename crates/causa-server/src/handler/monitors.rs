//! Health status handler.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use causa_completion::CompletionClient;

use super::response::MonitorStatusResponse;
use crate::extract::Json;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "causa_server::handler::monitors";

/// Reports service health without calling the completion endpoint.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(completion): State<CompletionClient>,
) -> (StatusCode, Json<MonitorStatusResponse>) {
    let health = completion.health_check().await;
    let status = if health.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        status = ?health.status,
        "Health status checked"
    );

    (status, Json(MonitorStatusResponse::new(health)))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}
