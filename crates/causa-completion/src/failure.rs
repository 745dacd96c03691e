//! Typed failures of a completion call.

use std::time::Duration;

use strum::IntoStaticStr;
use thiserror::Error;

use crate::shape::ShapeMismatch;

/// Why completion text could not be turned into a structured value.
#[derive(Debug, Clone, PartialEq, Eq, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MalformedReason {
    /// The 2xx body was not a chat completion envelope.
    #[error("completion envelope could not be decoded: {0}")]
    Envelope(String),

    /// The completion text held no `{...}` span.
    #[error("no JSON object found in completion text")]
    NoJsonObject,

    /// The recovered span was not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(String),

    /// The parsed value did not satisfy the expected shape.
    #[error(transparent)]
    StructureMismatch(#[from] ShapeMismatch),

    /// The validated value could not be decoded into the caller's type.
    #[error("could not decode structured value: {0}")]
    Decode(String),
}

/// A failed completion call.
///
/// Every upstream or parsing problem ends up here; none of them panic or
/// escape as a different error type.
#[derive(Debug, Clone, PartialEq, Eq, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CompletionFailure {
    /// The deadline elapsed and the in-flight exchange was cancelled.
    #[error("completion timed out after {}ms", deadline.as_millis())]
    Timeout { deadline: Duration },

    /// DNS, connect, reset, or another failure below HTTP.
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP 401 or 403.
    #[error("upstream rejected the credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Any other non-2xx status, with the vendor body kept verbatim.
    #[error("upstream returned HTTP {status}")]
    Upstream { status: u16, body: String },

    /// A 2xx reply without completion text.
    #[error("completion contained no text")]
    EmptyOutput,

    /// Completion text that could not be turned into the expected shape.
    #[error("malformed completion: {0}")]
    MalformedOutput(MalformedReason),
}

impl CompletionFailure {
    /// Snake-case name of the variant, for logs and metrics.
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Returns `true` for failures a caller may reasonably retry.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedOutput(_) | Self::EmptyOutput | Self::Unauthorized { .. } => false,
        }
    }

    /// Diagnostic detail for operator logs. Never shown to end users.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Transport(message) => Some(message),
            Self::Upstream { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn malformed(reason: impl Into<MalformedReason>) -> Self {
        Self::MalformedOutput(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(
            CompletionFailure::Timeout {
                deadline: Duration::from_millis(50)
            }
            .kind(),
            "timeout"
        );
        assert_eq!(CompletionFailure::EmptyOutput.kind(), "empty_output");
        assert_eq!(
            CompletionFailure::MalformedOutput(MalformedReason::NoJsonObject).kind(),
            "malformed_output"
        );
    }

    #[test]
    fn structure_mismatch_message_is_preserved() {
        let failure = CompletionFailure::malformed(ShapeMismatch::MissingKey {
            key: "results".into(),
        });
        assert_eq!(
            failure.to_string(),
            "malformed completion: structure mismatch: missing required key 'results'"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(CompletionFailure::Transport("reset".into()).is_retryable());
        assert!(
            CompletionFailure::Upstream {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            CompletionFailure::Upstream {
                status: 429,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !CompletionFailure::Upstream {
                status: 400,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!CompletionFailure::Unauthorized { status: 401 }.is_retryable());
        assert!(!CompletionFailure::EmptyOutput.is_retryable());
    }

    #[test]
    fn diagnostic_exposes_upstream_body() {
        let failure = CompletionFailure::Upstream {
            status: 500,
            body: r#"{"error":{"message":"boom"}}"#.into(),
        };
        assert_eq!(failure.diagnostic(), Some(r#"{"error":{"message":"boom"}}"#));
        assert_eq!(CompletionFailure::EmptyOutput.diagnostic(), None);
    }
}
