//! Transport seam between the client and the chat completion endpoint.
//!
//! A [`ChatTransport`] performs exactly one HTTP exchange and reports the
//! status and body as received. It does not interpret status codes or parse
//! the body; that is the client's job, so every transport gets identical
//! failure semantics.

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
mod http;

use std::time::Duration;

#[cfg(feature = "reqwest")]
pub use http::HttpTransport;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::health::ServiceHealth;
use crate::wire::ChatCompletionRequest;

/// Status and body of one exchange, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

impl TransportReply {
    /// Creates a new reply.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure below the HTTP status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport's own timer fired.
    #[error("request timed out")]
    Timeout,

    /// The exchange observed its cancellation token.
    #[error("request cancelled")]
    Cancelled,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure while sending or reading the body.
    #[error("request failed: {0}")]
    Request(String),
}

/// Performs one chat completion exchange.
///
/// Implementations must stop work promptly once `cancel` fires, and must be
/// safe to drop mid-flight: the client drops the exchange future when the
/// caller's deadline passes.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends `body` and returns the raw reply.
    ///
    /// `deadline` is the caller's budget for the whole call; transports may
    /// use it as their own per-request timeout.
    async fn send(
        &self,
        body: &ChatCompletionRequest,
        deadline: Duration,
        cancel: CancellationToken,
    ) -> Result<TransportReply, TransportError>;

    /// Reports transport health without contacting the endpoint.
    async fn health_check(&self) -> ServiceHealth {
        ServiceHealth::healthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        assert!(TransportReply::new(200, "").is_success());
        assert!(TransportReply::new(204, "").is_success());
        assert!(!TransportReply::new(301, "").is_success());
        assert!(!TransportReply::new(500, "").is_success());
    }
}
