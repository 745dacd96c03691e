//! Middleware for `axum::Router`.
//!
//! ```rust
//! use axum::Router;
//! use causa_server::middleware::RouterExt;
//!
//! let app: Router = Router::new()
//!     .with_recovery_layer(1024 * 1024)
//!     .with_observability_layer();
//! ```

mod extensions;
mod observability;
mod recovery;

pub use extensions::RouterExt;
