//! Reqwest-based transport for the chat completion endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{ChatTransport, TransportError, TransportReply};
use crate::config::{ApiKey, CompletionConfig};
use crate::error::{Error, Result};
use crate::health::ServiceHealth;
use crate::wire::ChatCompletionRequest;
use crate::TRACING_TARGET_TRANSPORT;

/// Inner transport that holds the HTTP client and endpoint.
struct HttpTransportInner {
    http: Client,
    endpoint: Url,
    api_key: ApiKey,
}

/// Sends chat completion requests over HTTPS with bearer authentication.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Creates a new transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a missing or placeholder API key or
    /// an invalid base URL, and an internal error if the HTTP client cannot
    /// be built.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        let endpoint = config.endpoint()?;
        let connect_timeout = config.connect_timeout();

        tracing::debug!(
            target: TRACING_TARGET_TRANSPORT,
            endpoint = %endpoint,
            connect_timeout_ms = connect_timeout.as_millis(),
            "Creating HTTP transport"
        );

        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(|e| {
                Error::internal()
                    .with_message("failed to create HTTP client")
                    .with_source(e)
            })?;

        let inner = HttpTransportInner {
            http,
            endpoint,
            api_key,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the chat completions endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    async fn exchange(
        &self,
        body: &ChatCompletionRequest,
        deadline: Duration,
    ) -> std::result::Result<TransportReply, reqwest::Error> {
        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .bearer_auth(self.inner.api_key.expose())
            .json(body)
            .timeout(deadline)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportReply { status, body })
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpTransport {
    async fn send(
        &self,
        body: &ChatCompletionRequest,
        deadline: Duration,
        cancel: CancellationToken,
    ) -> std::result::Result<TransportReply, TransportError> {
        tracing::trace!(
            target: TRACING_TARGET_TRANSPORT,
            endpoint = %self.inner.endpoint,
            model = %body.model,
            deadline_ms = deadline.as_millis(),
            "Sending chat completion request"
        );

        // Dropping the exchange future aborts the underlying connection.
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.exchange(body, deadline) => result.map_err(TransportError::from),
        }
    }

    async fn health_check(&self) -> ServiceHealth {
        ServiceHealth::healthy()
            .with_metric("endpoint", self.inner.endpoint.as_str().into())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}
