//! JSON extractor whose rejections render as [`ErrorResponse`] bodies.
//!
//! [`ErrorResponse`]: crate::handler::ErrorResponse

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Drop-in replacement for [`axum::Json`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = <AxumJson<T> as FromRequest<S>>::from_request(req, state).await;
        extractor.map(|x| Self::new(x.0)).map_err(Into::into)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => ErrorKind::BadRequest.with_message(format!(
                "Invalid request data format: {}",
                sanitize_error_message(&err.body_text())
            )),
            JsonRejection::JsonSyntaxError(_) => {
                ErrorKind::BadRequest.with_message("Invalid JSON syntax in request body")
            }
            JsonRejection::MissingJsonContentType(_) => ErrorKind::BadRequest
                .with_message("Request must have Content-Type header set to 'application/json'"),
            JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ErrorKind::PayloadTooLarge.into_error()
            }
            JsonRejection::BytesRejection(_) => {
                ErrorKind::BadRequest.with_message("Failed to read request body")
            }
            _ => ErrorKind::InternalServerError.into_error(),
        }
    }
}

/// Keeps rejection details short enough to show to clients.
fn sanitize_error_message(message: &str) -> String {
    let lines = message.lines().take(3).collect::<Vec<_>>();
    lines.join(" ").chars().take(200).collect()
}
