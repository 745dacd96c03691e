//! Completion request type.

use std::time::Duration;

use derive_builder::Builder;

use crate::error::Result;
use crate::wire::ResponseFormat;

/// Default values for request options.
pub(crate) mod defaults {
    /// Low temperature biases the model toward parseable output.
    pub const TEMPERATURE: f64 = 0.1;

    /// Default completion budget in tokens.
    pub const MAX_OUTPUT_TOKENS: u32 = 2048;
}

/// Validates a request before it is built.
fn validate_request(builder: &CompletionRequestBuilder) -> std::result::Result<(), String> {
    if let Some(prompt) = &builder.prompt
        && prompt.trim().is_empty()
    {
        return Err("prompt must not be empty".to_owned());
    }

    if let Some(deadline) = builder.deadline
        && deadline.is_zero()
    {
        return Err("deadline must be a positive duration".to_owned());
    }

    if let Some(temperature) = builder.temperature
        && !(0.0..=1.0).contains(&temperature)
    {
        return Err(format!(
            "temperature must be between 0.0 and 1.0, got {temperature}"
        ));
    }

    if let Some(max_output_tokens) = builder.max_output_tokens
        && max_output_tokens == 0
    {
        return Err("max output tokens must be greater than 0".to_owned());
    }

    if let Some(Some(model)) = &builder.model
        && model.trim().is_empty()
    {
        return Err("model must not be blank".to_owned());
    }

    Ok(())
}

/// One completion request.
///
/// A request is consumed by [`CompletionClient::complete`], so it can only
/// ever back a single call. The builder rejects an empty prompt, a zero
/// deadline, a temperature outside `[0, 1]` and a zero token budget.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use causa_completion::CompletionRequest;
///
/// let request = CompletionRequest::builder()
///     .with_prompt("jurisprudência sobre dano moral")
///     .with_system_instruction("Responda em português.")
///     .with_deadline(Duration::from_secs(10))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.temperature(), 0.1);
/// ```
///
/// [`CompletionClient::complete`]: crate::CompletionClient::complete
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "validate_request")
)]
pub struct CompletionRequest {
    /// User prompt.
    prompt: String,

    /// Caller instruction appended after the fixed JSON-only instruction.
    #[builder(default)]
    system_instruction: String,

    /// Model override; the client default is used when absent.
    #[builder(default)]
    model: Option<String>,

    /// Sampling temperature in `[0, 1]`.
    #[builder(default = "defaults::TEMPERATURE")]
    temperature: f64,

    /// Completion budget in tokens.
    #[builder(default = "defaults::MAX_OUTPUT_TOKENS")]
    max_output_tokens: u32,

    /// Hard deadline for the whole call.
    deadline: Duration,

    /// Response-format override; the client default is used when absent.
    #[builder(default)]
    response_format: Option<ResponseFormat>,
}

impl CompletionRequest {
    /// Creates a new request builder.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }

    /// Creates a request with default options.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error for an empty prompt or zero deadline.
    pub fn new(prompt: impl Into<String>, deadline: Duration) -> Result<Self> {
        Ok(Self::builder()
            .with_prompt(prompt)
            .with_deadline(deadline)
            .build()?)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn response_format(&self) -> Option<&ResponseFormat> {
        self.response_format.as_ref()
    }
}
