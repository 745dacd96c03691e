//! Health reporting for the completion client.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::failure::CompletionFailure;

/// Operational status of a service, ordered from best to worst.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Operating normally.
    #[default]
    Healthy,
    /// Functional with issues.
    Degraded,
    /// Not operational.
    Unhealthy,
}

/// Point-in-time health report.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: ServiceStatus,
    /// Time spent producing the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: Timestamp,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metrics: HashMap<String, Value>,
}

impl ServiceHealth {
    /// Creates a healthy report.
    pub fn healthy() -> Self {
        Self {
            status: ServiceStatus::Healthy,
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Creates a degraded report.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Degraded,
            message: Some(message.into()),
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    /// Creates an unhealthy report.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            message: Some(message.into()),
            checked_at: Timestamp::now(),
            ..Default::default()
        }
    }

    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response = Some(response_time);
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }

    /// Returns `true` unless the status is [`ServiceStatus::Unhealthy`].
    pub fn is_operational(&self) -> bool {
        self.status != ServiceStatus::Unhealthy
    }
}

/// Endpoint status observed by the most recent completion call.
///
/// A rejected key makes the client unhealthy. Timeouts, transport errors and
/// upstream errors degrade it. Any reply that reached the model, including
/// one with unusable output, clears both.
#[derive(Debug, Default)]
pub(crate) struct ObservedStatus(Mutex<Option<(ServiceStatus, String)>>);

impl ObservedStatus {
    pub fn record<T>(&self, result: &Result<T, CompletionFailure>) {
        let observed = match result {
            Err(CompletionFailure::Unauthorized { status }) => Some((
                ServiceStatus::Unhealthy,
                format!("completion endpoint rejected the API key ({status})"),
            )),
            Err(
                failure @ (CompletionFailure::Timeout { .. }
                | CompletionFailure::Transport(_)
                | CompletionFailure::Upstream { .. }),
            ) => Some((
                ServiceStatus::Degraded,
                format!("last completion failed: {}", failure.kind()),
            )),
            Ok(_) | Err(CompletionFailure::EmptyOutput | CompletionFailure::MalformedOutput(_)) => {
                None
            }
        };

        if let Ok(mut slot) = self.0.lock() {
            *slot = observed;
        }
    }

    /// Downgrades `health` to the observed status when that is worse.
    pub fn apply(&self, mut health: ServiceHealth) -> ServiceHealth {
        let observed = self.0.lock().ok().and_then(|slot| slot.clone());

        if let Some((status, message)) = observed
            && status > health.status
        {
            health.status = status;
            health.message = Some(message);
        }

        health
    }
}
