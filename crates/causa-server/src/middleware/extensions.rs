use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::middleware::observability::{
    create_propagate_request_id_layer, create_request_id_layer, create_sensitive_headers_layer,
    create_trace_layer,
};
use crate::middleware::recovery::catch_panic;

/// Extension trait for `axum::`[`Router`] for layering middleware.
pub trait RouterExt<S> {
    /// Layers [`CatchPanic`] and [`RequestBodyLimit`] middlewares.
    ///
    /// [`CatchPanic`]: tower_http::catch_panic::CatchPanicLayer
    /// [`RequestBodyLimit`]: tower_http::limit::RequestBodyLimitLayer
    fn with_recovery_layer(self, max_body_size: usize) -> Self;

    /// Layers [`SetRequestId`], [`Trace`] and [`PropagateRequestId`] middlewares.
    ///
    /// [`SetRequestId`]: tower_http::request_id::SetRequestIdLayer
    /// [`Trace`]: tower_http::trace::TraceLayer
    /// [`PropagateRequestId`]: tower_http::request_id::PropagateRequestIdLayer
    fn with_observability_layer(self) -> Self;
}

impl<S> RouterExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery_layer(self, max_body_size: usize) -> Self {
        let middlewares = ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(catch_panic))
            .layer(RequestBodyLimitLayer::new(max_body_size));

        self.layer(middlewares)
    }

    fn with_observability_layer(self) -> Self {
        // Applied in reverse order: the last layer wraps the others.
        self.layer(create_propagate_request_id_layer())
            .layer(create_sensitive_headers_layer())
            .layer(create_trace_layer())
            .layer(create_request_id_layer())
    }
}
