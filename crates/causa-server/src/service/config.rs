#[cfg(feature = "config")]
use clap::Args;
use causa_completion::{CompletionClient, CompletionConfig, Error, Result};
use serde::{Deserialize, Serialize};

/// Default values for configuration options.
mod defaults {
    /// Maximum request body size in bytes.
    pub const MAX_BODY_SIZE: usize = 4 * 1024 * 1024;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Completion endpoint settings.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(flatten)]
    pub completion: CompletionConfig,

    /// Maximum accepted request body size in bytes.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-body-size",
            env = "CAUSA_MAX_BODY_SIZE",
            default_value_t = defaults::MAX_BODY_SIZE
        )
    )]
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_max_body_size() -> usize {
    defaults::MAX_BODY_SIZE
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            completion: CompletionConfig::default(),
            max_body_size: defaults::MAX_BODY_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Creates a configuration around completion settings.
    pub fn new(completion: CompletionConfig) -> Self {
        Self {
            completion,
            ..Self::default()
        }
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a bad completion setting or a zero
    /// body limit.
    pub fn validate(&self) -> Result<()> {
        self.completion.validate()?;

        if self.max_body_size == 0 {
            return Err(Error::configuration().with_message("max body size must be greater than 0"));
        }

        Ok(())
    }

    /// Creates the completion client.
    pub fn connect_completion(&self) -> Result<CompletionClient> {
        CompletionClient::new(&self.completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_needs_api_key() {
        let config = ServiceConfig::default();
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn zero_body_limit_is_rejected() {
        let config =
            ServiceConfig::new(CompletionConfig::new("sk-live-1234")).with_max_body_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn configured_client_is_created() {
        let config = ServiceConfig::new(CompletionConfig::new("sk-live-1234"));
        assert!(config.validate().is_ok());
        assert!(config.connect_completion().is_ok());
    }
}
