use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body of every error response.
///
/// Messages are safe to show to end users. Upstream diagnostics never reach
/// this type; they are logged where the failure is converted.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// The error name/type identifier
    pub name: Cow<'a, str>,
    /// User-friendly error message safe for client display
    pub message: Cow<'a, str>,
    /// The resource that the error relates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "The request could not be processed due to invalid data",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self = Self::new(
        "not_found",
        "The requested resource was not found",
        StatusCode::NOT_FOUND,
    );
    pub const PAYLOAD_TOO_LARGE: Self = Self::new(
        "payload_too_large",
        "The request body is too large",
        StatusCode::PAYLOAD_TOO_LARGE,
    );
    // 5xx Server Errors
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "An internal server error occurred. Please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const COMPLETION_FAILED: Self = Self::new(
        "completion_failed",
        "The assistant could not complete the request. Please try again",
        StatusCode::BAD_GATEWAY,
    );
    pub const COMPLETION_TIMEOUT: Self = Self::new(
        "completion_timeout",
        "The assistant took too long to respond. Please try again",
        StatusCode::GATEWAY_TIMEOUT,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            status,
        }
    }

    /// Replaces the message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the resource the error relates to.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_not_serialized() {
        let response = ErrorResponse::COMPLETION_FAILED.with_resource("legal_search");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["name"], "completion_failed");
        assert_eq!(json["resource"], "legal_search");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn completion_statuses() {
        assert_eq!(ErrorResponse::COMPLETION_FAILED.status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            ErrorResponse::COMPLETION_TIMEOUT.status,
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
