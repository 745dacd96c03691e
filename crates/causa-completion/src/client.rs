//! Deadline-bounded structured completion client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "reqwest")]
use crate::config::CompletionConfig;
use crate::error::Result;
use crate::failure::{CompletionFailure, MalformedReason};
use crate::health::{ObservedStatus, ServiceHealth};
use crate::prompt::StructuredPrompt;
use crate::recovery::{BraceSpan, JsonRecovery};
use crate::request::CompletionRequest;
use crate::response::{CompletionResult, StructuredCompletion, TypedCompletion};
use crate::shape::ExpectedShape;
#[cfg(feature = "reqwest")]
use crate::transport::HttpTransport;
use crate::transport::{ChatTransport, TransportError, TransportReply};
use crate::wire::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat};
use crate::TRACING_TARGET_CLIENT;

/// Fixed system instruction sent ahead of every caller instruction.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single valid JSON object and nothing \
     else. Do not add explanations, commentary or markdown formatting.";

/// Inner client state shared between clones.
struct CompletionClientInner {
    transport: Arc<dyn ChatTransport>,
    default_model: String,
    json_mode: bool,
    recovery: Arc<dyn JsonRecovery>,
    observed: Arc<ObservedStatus>,
}

/// Client for deadline-bounded structured completions.
///
/// The client is cheap to clone and one instance can serve any number of
/// concurrent calls. Its only mutable state is the endpoint status seen by the
/// latest call, which [`health_check`](Self::health_check) reports. Each call to
/// [`complete`](Self::complete) makes exactly one outbound request and never
/// retries.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use causa_completion::{CompletionClient, CompletionConfig, CompletionRequest, ExpectedShape};
///
/// # async fn run() -> causa_completion::Result<()> {
/// let config = CompletionConfig::new(std::env::var("CAUSA_LLM_API_KEY").unwrap_or_default());
/// let client = CompletionClient::new(&config)?;
///
/// let request = CompletionRequest::new("jurisprudência sobre dano moral", Duration::from_secs(10))?;
/// match client.complete(request, &ExpectedShape::array("results")).await {
///     Ok(completion) => println!("{}", completion.structured),
///     Err(failure) => eprintln!("{failure}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CompletionClient {
    inner: Arc<CompletionClientInner>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("default_model", &self.inner.default_model)
            .field("json_mode", &self.inner.json_mode)
            .field("recovery", &self.inner.recovery.name())
            .finish_non_exhaustive()
    }
}

impl CompletionClient {
    /// Creates a client backed by [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a missing or placeholder API key, an
    /// invalid base URL or an empty default model.
    #[cfg(feature = "reqwest")]
    #[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;

        Ok(Self::with_transport(transport)
            .with_default_model(config.llm_model.clone())
            .with_json_mode(config.llm_json_mode))
    }

    /// Creates a client over any transport, with default settings.
    pub fn with_transport(transport: impl ChatTransport + 'static) -> Self {
        let inner = CompletionClientInner {
            transport: Arc::new(transport),
            default_model: crate::config::defaults::MODEL.to_owned(),
            json_mode: true,
            recovery: Arc::new(BraceSpan),
            observed: Arc::default(),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Set the model used when a request does not name one.
    pub fn with_default_model(self, model: impl Into<String>) -> Self {
        self.map_inner(|inner| inner.default_model = model.into())
    }

    /// Set whether `response_format: json_object` is sent by default.
    pub fn with_json_mode(self, json_mode: bool) -> Self {
        self.map_inner(|inner| inner.json_mode = json_mode)
    }

    /// Set the structural recovery stage.
    pub fn with_recovery(self, recovery: impl JsonRecovery + 'static) -> Self {
        let recovery: Arc<dyn JsonRecovery> = Arc::new(recovery);
        self.map_inner(|inner| inner.recovery = recovery)
    }

    fn map_inner(self, f: impl FnOnce(&mut CompletionClientInner)) -> Self {
        let mut inner = CompletionClientInner {
            transport: Arc::clone(&self.inner.transport),
            default_model: self.inner.default_model.clone(),
            json_mode: self.inner.json_mode,
            recovery: Arc::clone(&self.inner.recovery),
            observed: Arc::clone(&self.inner.observed),
        };
        f(&mut inner);

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the model used when a request does not name one.
    pub fn default_model(&self) -> &str {
        &self.inner.default_model
    }

    /// Runs one completion and validates it against `expected`.
    ///
    /// The outbound exchange is raced against the request deadline. When the
    /// deadline wins, the exchange is cancelled and dropped before
    /// [`CompletionFailure::Timeout`] is returned.
    pub async fn complete(
        &self,
        request: CompletionRequest,
        expected: &ExpectedShape,
    ) -> CompletionResult {
        let started = Instant::now();
        let deadline = request.deadline();
        let body = self.build_body(&request);

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %body.model,
            deadline_ms = deadline.as_millis(),
            recovery = self.inner.recovery.name(),
            "Dispatching completion request"
        );

        let result = match self.exchange(&body, deadline).await {
            Ok(reply) => self.interpret(reply, expected, started),
            Err(failure) => Err(failure),
        };
        self.inner.observed.record(&result);

        match &result {
            Ok(completion) => tracing::debug!(
                target: TRACING_TARGET_CLIENT,
                model = completion.model.as_deref().unwrap_or(body.model.as_str()),
                elapsed_ms = completion.elapsed.as_millis(),
                "Completion succeeded"
            ),
            Err(failure) => tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                failure_kind = failure.kind(),
                elapsed_ms = started.elapsed().as_millis(),
                diagnostic = failure.diagnostic().unwrap_or_default(),
                error = %failure,
                "Completion failed"
            ),
        }

        result
    }

    /// Runs [`complete`](Self::complete) and decodes the validated value into `T`.
    ///
    /// A decoding failure is reported as
    /// [`MalformedReason::Decode`] inside [`CompletionFailure::MalformedOutput`].
    pub async fn complete_typed<T: DeserializeOwned>(
        &self,
        request: CompletionRequest,
        expected: &ExpectedShape,
    ) -> CompletionResult<TypedCompletion<T>> {
        let completion = self.complete(request, expected).await?;

        match completion.deserialize::<T>() {
            Ok(data) => Ok(TypedCompletion { data, completion }),
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET_CLIENT,
                    failure_kind = "malformed_output",
                    error = %e,
                    "Completion could not be decoded"
                );
                Err(CompletionFailure::malformed(MalformedReason::Decode(
                    e.to_string(),
                )))
            }
        }
    }

    /// Runs a preset prompt and decodes its typed output.
    ///
    /// # Errors
    ///
    /// The outer `Result` fails only when the prompt cannot form a request,
    /// for example a blank query.
    pub async fn run_prompt<P: StructuredPrompt>(
        &self,
        prompt: P,
    ) -> Result<CompletionResult<TypedCompletion<P::Output>>> {
        let expected = prompt.expected_shape();
        let request = prompt.into_request()?;
        Ok(self.complete_typed(request, &expected).await)
    }

    /// Reports client health without contacting the endpoint.
    ///
    /// The transport's own report is downgraded by the outcome of the latest
    /// call: a rejected API key is unhealthy, and a timeout, transport or
    /// upstream failure is degraded.
    pub async fn health_check(&self) -> ServiceHealth {
        let started = Instant::now();
        let health = self.inner.transport.health_check().await;

        self.inner
            .observed
            .apply(health)
            .with_response_time(started.elapsed())
            .with_metric("default_model", Value::from(self.inner.default_model.as_str()))
            .with_metric("json_mode", Value::from(self.inner.json_mode))
    }

    fn build_body(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let system = if request.system_instruction().trim().is_empty() {
            JSON_ONLY_INSTRUCTION.to_owned()
        } else {
            format!(
                "{JSON_ONLY_INSTRUCTION}\n\n{}",
                request.system_instruction()
            )
        };

        let response_format = request
            .response_format()
            .cloned()
            .or_else(|| self.inner.json_mode.then_some(ResponseFormat::JsonObject));

        ChatCompletionRequest {
            model: request
                .model()
                .unwrap_or(&self.inner.default_model)
                .to_owned(),
            messages: vec![
                ChatMessage::system(system),
                ChatMessage::user(request.prompt()),
            ],
            temperature: request.temperature(),
            max_tokens: request.max_output_tokens(),
            response_format,
        }
    }

    /// Races the transport against the deadline.
    async fn exchange(
        &self,
        body: &ChatCompletionRequest,
        deadline: Duration,
    ) -> CompletionResult<TransportReply> {
        let cancel = CancellationToken::new();
        let send = self.inner.transport.send(body, deadline, cancel.clone());

        let outcome = tokio::select! {
            result = send => result,
            () = tokio::time::sleep(deadline) => {
                cancel.cancel();
                return Err(CompletionFailure::Timeout { deadline });
            }
        };

        outcome.map_err(|error| match error {
            TransportError::Timeout | TransportError::Cancelled => {
                CompletionFailure::Timeout { deadline }
            }
            TransportError::Connect(message) | TransportError::Request(message) => {
                CompletionFailure::Transport(message)
            }
        })
    }

    /// Maps a raw reply to a completion result.
    fn interpret(
        &self,
        reply: TransportReply,
        expected: &ExpectedShape,
        started: Instant,
    ) -> CompletionResult {
        match reply.status {
            401 | 403 => return Err(CompletionFailure::Unauthorized { status: reply.status }),
            status if !reply.is_success() => {
                return Err(CompletionFailure::Upstream {
                    status,
                    body: reply.body,
                });
            }
            _ => {}
        }

        let envelope: ChatCompletionResponse = serde_json::from_str(&reply.body)
            .map_err(|e| CompletionFailure::malformed(MalformedReason::Envelope(e.to_string())))?;

        let raw_text = envelope
            .first_content()
            .ok_or(CompletionFailure::EmptyOutput)?;

        let span = self
            .inner
            .recovery
            .recover(raw_text)
            .ok_or(CompletionFailure::malformed(MalformedReason::NoJsonObject))?;

        let structured: Value = serde_json::from_str(span)
            .map_err(|e| CompletionFailure::malformed(MalformedReason::Parse(e.to_string())))?;

        expected
            .validate(&structured)
            .map_err(CompletionFailure::malformed)?;

        Ok(StructuredCompletion {
            structured,
            raw_text: raw_text.to_owned(),
            model: envelope.model.clone(),
            usage: envelope.usage,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::health::ServiceStatus;

    #[derive(Debug)]
    struct Fixed(u16, String);

    #[async_trait::async_trait]
    impl ChatTransport for Fixed {
        async fn send(
            &self,
            _body: &ChatCompletionRequest,
            _deadline: Duration,
            _cancel: CancellationToken,
        ) -> std::result::Result<TransportReply, TransportError> {
            Ok(TransportReply::new(self.0, self.1.clone()))
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("q", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn system_message_appends_caller_instruction() {
        let client = CompletionClient::with_transport(Fixed(200, String::new()));
        let request = CompletionRequest::builder()
            .with_prompt("q")
            .with_system_instruction("Responda em português.")
            .with_deadline(Duration::from_secs(1))
            .build()
            .unwrap();

        let body = client.build_body(&request);
        assert_eq!(body.messages.len(), 2);
        assert_eq!(
            body.messages[0].content,
            format!("{JSON_ONLY_INSTRUCTION}\n\nResponda em português.")
        );
        assert_eq!(body.messages[1].content, "q");
        assert_eq!(body.response_format, Some(ResponseFormat::JsonObject));
    }

    #[test]
    fn request_model_overrides_default() {
        let client =
            CompletionClient::with_transport(Fixed(200, String::new())).with_default_model("base");
        assert_eq!(client.build_body(&request()).model, "base");

        let request = CompletionRequest::builder()
            .with_prompt("q")
            .with_deadline(Duration::from_secs(1))
            .with_model("override")
            .build()
            .unwrap();
        assert_eq!(client.build_body(&request).model, "override");
    }

    #[test]
    fn json_mode_off_omits_response_format() {
        let client = CompletionClient::with_transport(Fixed(200, String::new())).with_json_mode(false);
        assert!(client.build_body(&request()).response_format.is_none());
    }

    #[tokio::test]
    async fn non_envelope_body_is_malformed() {
        let client = CompletionClient::with_transport(Fixed(200, "<html>".into()));
        let failure = client
            .complete(request(), &ExpectedShape::new())
            .await
            .unwrap_err();
        assert!(matches!(
            failure,
            CompletionFailure::MalformedOutput(MalformedReason::Envelope(_))
        ));
    }

    #[tokio::test]
    async fn envelope_metadata_is_carried() {
        let body = json!({
            "model": "gpt-4o-mini-2024",
            "choices": [{"message": {"content": "{\"ok\": true}"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
        });
        let client = CompletionClient::with_transport(Fixed(200, body.to_string()));
        let completion = client
            .complete(request(), &ExpectedShape::new())
            .await
            .unwrap();

        assert_eq!(completion.model.as_deref(), Some("gpt-4o-mini-2024"));
        assert_eq!(completion.usage.map(|u| u.total_tokens), Some(7));
    }

    #[tokio::test]
    async fn health_reports_client_settings() {
        let client = CompletionClient::with_transport(Fixed(200, String::new()));
        let health = client.health_check().await;
        assert!(health.is_operational());
        assert_eq!(health.metrics["json_mode"], json!(true));
    }

    #[tokio::test]
    async fn health_follows_latest_call() {
        let client = CompletionClient::with_transport(Fixed(401, "bad key".into()));
        let _ = client.complete(request(), &ExpectedShape::new()).await;
        let health = client.health_check().await;
        assert_eq!(health.status, ServiceStatus::Unhealthy);
        assert!(!health.is_operational());

        let client = CompletionClient::with_transport(Fixed(502, "bad gateway".into()));
        let _ = client.complete(request(), &ExpectedShape::new()).await;
        assert_eq!(client.health_check().await.status, ServiceStatus::Degraded);
    }

    #[tokio::test]
    async fn clones_share_observed_status() {
        let client = CompletionClient::with_transport(Fixed(403, String::new()));
        let reconfigured = client.clone().with_default_model("gpt-4o");

        let _ = reconfigured.complete(request(), &ExpectedShape::new()).await;
        assert_eq!(client.health_check().await.status, ServiceStatus::Unhealthy);
    }
}
