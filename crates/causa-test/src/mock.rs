//! Scripted chat transport.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use causa_completion::CompletionClient;
use causa_completion::transport::{ChatTransport, TransportError, TransportReply};
use causa_completion::wire::ChatCompletionRequest;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Wraps completion text in a minimal chat completion envelope.
pub fn chat_envelope(content: &str) -> String {
    json!({
        "model": "mock-model",
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

/// Chat transport that replies from a script.
#[derive(Debug, Clone)]
pub struct MockTransport {
    reply: Result<TransportReply, TransportError>,
    latency: Option<Duration>,
    requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl MockTransport {
    /// Replies 200 with `content` as the completion text.
    pub fn completing(content: &str) -> Self {
        Self::replying(200, chat_envelope(content))
    }

    /// Replies with a raw status and body.
    pub fn replying(status: u16, body: impl Into<String>) -> Self {
        Self {
            reply: Ok(TransportReply::new(status, body)),
            latency: None,
            requests: Arc::default(),
        }
    }

    /// Fails below HTTP.
    pub fn failing(error: TransportError) -> Self {
        Self {
            reply: Err(error),
            latency: None,
            requests: Arc::default(),
        }
    }

    /// Delays every reply. The delay ends early if the call is cancelled.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ChatTransport for MockTransport {
    async fn send(
        &self,
        body: &ChatCompletionRequest,
        _deadline: Duration,
        cancel: CancellationToken,
    ) -> Result<TransportReply, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(body.clone());
        }

        if let Some(latency) = self.latency {
            tokio::select! {
                () = cancel.cancelled() => return Err(TransportError::Cancelled),
                () = tokio::time::sleep(latency) => {}
            }
        }

        self.reply.clone()
    }
}

/// Builds a client over `transport`.
pub fn mock_client(transport: MockTransport) -> CompletionClient {
    CompletionClient::with_transport(transport)
}

#[cfg(test)]
mod tests {
    use causa_completion::{CompletionFailure, CompletionRequest, ExpectedShape};

    use super::*;

    #[tokio::test]
    async fn scripted_completion_is_returned() {
        let transport = MockTransport::completing(r#"{"results": []}"#);
        let client = mock_client(transport.clone());
        let request = CompletionRequest::new("q", Duration::from_secs(1)).unwrap();

        let completion = client
            .complete(request, &ExpectedShape::array("results"))
            .await
            .unwrap();

        assert_eq!(completion.model.as_deref(), Some("mock-model"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_past_deadline_times_out() {
        let transport = MockTransport::completing("{}").with_latency(Duration::from_secs(60));
        let client = mock_client(transport);
        let request = CompletionRequest::new("q", Duration::from_secs(1)).unwrap();

        let failure = client
            .complete(request, &ExpectedShape::new())
            .await
            .unwrap_err();
        assert!(matches!(failure, CompletionFailure::Timeout { .. }));
    }
}
