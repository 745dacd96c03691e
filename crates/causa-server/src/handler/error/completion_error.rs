//! Completion failure to HTTP error conversion.
//!
//! The failure kind and its diagnostic are logged here for operators. Clients
//! only ever see the generic message of the mapped [`ErrorKind`].

use causa_completion::{CompletionFailure, ErrorKind as CompletionErrorKind};

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for completion error conversions.
const TRACING_TARGET: &str = "causa_server::handler::completion";

impl From<CompletionFailure> for HttpError<'static> {
    fn from(failure: CompletionFailure) -> Self {
        match &failure {
            CompletionFailure::Timeout { deadline } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    failure_kind = failure.kind(),
                    deadline_ms = deadline.as_millis(),
                    "Completion timed out"
                );
                return ErrorKind::CompletionTimeout.into_error();
            }
            CompletionFailure::Unauthorized { status } => {
                tracing::error!(
                    target: TRACING_TARGET,
                    failure_kind = failure.kind(),
                    status = status,
                    "Completion endpoint rejected the API key"
                );
            }
            CompletionFailure::Upstream { status, body } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    failure_kind = failure.kind(),
                    status = status,
                    diagnostic = %body,
                    "Completion endpoint returned an error"
                );
            }
            _ => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    failure_kind = failure.kind(),
                    retryable = failure.is_retryable(),
                    error = %failure,
                    "Completion failed"
                );
            }
        }

        ErrorKind::CompletionFailed.into_error()
    }
}

impl From<causa_completion::Error> for HttpError<'static> {
    fn from(error: causa_completion::Error) -> Self {
        match error.kind() {
            CompletionErrorKind::InvalidInput => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Rejected completion input"
                );

                let message = error
                    .message
                    .unwrap_or_else(|| "Invalid request data".to_owned());
                ErrorKind::BadRequest.with_message(message)
            }
            _ => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = error.kind_str(),
                    "Completion setup failed"
                );

                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}
