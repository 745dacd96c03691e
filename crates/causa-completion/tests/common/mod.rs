#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use causa_completion::transport::{ChatTransport, TransportError, TransportReply};
use causa_completion::wire::ChatCompletionRequest;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Wraps completion text in a chat completion envelope.
pub fn envelope(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
    })
    .to_string()
}

/// Replies with a fixed status and body and records every request.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    reply: Result<TransportReply, TransportError>,
    pub requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl ScriptedTransport {
    pub fn ok(content: &str) -> Self {
        Self::status(200, envelope(content))
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            reply: Ok(TransportReply::new(status, body)),
            requests: Arc::default(),
        }
    }

    pub fn error(error: TransportError) -> Self {
        Self {
            reply: Err(error),
            requests: Arc::default(),
        }
    }

    pub fn sent(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(
        &self,
        body: &ChatCompletionRequest,
        _deadline: Duration,
        _cancel: CancellationToken,
    ) -> Result<TransportReply, TransportError> {
        self.requests.lock().unwrap().push(body.clone());
        self.reply.clone()
    }
}

/// Sets its flag when dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Never replies. Records whether the exchange saw its token fire and
/// whether the in-flight future was dropped.
#[derive(Debug, Clone, Default)]
pub struct StalledTransport {
    pub token_cancelled: Arc<AtomicBool>,
    pub future_dropped: Arc<AtomicBool>,
    pub observed_token: Arc<Mutex<Option<CancellationToken>>>,
}

impl StalledTransport {
    pub fn was_dropped(&self) -> bool {
        self.future_dropped.load(Ordering::SeqCst)
    }

    pub fn was_cancelled(&self) -> bool {
        self.observed_token
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

#[async_trait::async_trait]
impl ChatTransport for StalledTransport {
    async fn send(
        &self,
        _body: &ChatCompletionRequest,
        _deadline: Duration,
        cancel: CancellationToken,
    ) -> Result<TransportReply, TransportError> {
        let _guard = DropFlag(Arc::clone(&self.future_dropped));
        *self.observed_token.lock().unwrap() = Some(cancel.clone());

        cancel.cancelled().await;
        self.token_cancelled.store(true, Ordering::SeqCst);
        Err(TransportError::Cancelled)
    }
}
