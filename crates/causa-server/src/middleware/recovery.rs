use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::handler::ErrorKind;

type Panic = Box<dyn Any + Send + 'static>;

/// Transforms a handler panic into a generic 500 response.
pub fn catch_panic(err: Panic) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic type");

    tracing::error!(
        target: "causa_server::middleware::recovery",
        panic = detail,
        "Handler panicked"
    );

    ErrorKind::InternalServerError.into_response()
}
