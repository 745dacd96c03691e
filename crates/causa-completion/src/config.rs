//! Completion client configuration.

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Default values for configuration options.
pub(crate) mod defaults {
    /// Chat completion API base URL.
    pub const BASE_URL: &str = "https://api.openai.com/v1";

    /// Model used when a request does not name one.
    pub const MODEL: &str = "gpt-4o-mini";

    /// TCP connect timeout in seconds.
    pub const CONNECT_TIMEOUT_SECS: u64 = 5;
}

/// Values that ship in `.env.example` files and must never reach the vendor.
const PLACEHOLDER_KEYS: &[&str] = &[
    "your-api-key",
    "your_api_key",
    "your-api-key-here",
    "changeme",
    "placeholder",
    "api-key",
    "sk-...",
];

/// A bearer secret for the completion endpoint.
///
/// The key is validated on construction and is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new API key, rejecting empty and placeholder values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is blank or looks like a
    /// template placeholder.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();

        if trimmed.is_empty() {
            return Err(Error::configuration().with_message("API key is empty"));
        }

        if Self::is_placeholder(trimmed) {
            return Err(Error::configuration().with_message("API key is a placeholder value"));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns `true` if the value is a known placeholder rather than a secret.
    pub fn is_placeholder(value: &str) -> bool {
        let lowered = value.trim().to_ascii_lowercase();

        PLACEHOLDER_KEYS.contains(&lowered.as_str())
            || lowered.contains("...")
            || (lowered.starts_with('<') && lowered.ends_with('>'))
            || lowered.chars().all(|c| c == 'x' || c == '*')
    }

    /// Returns the secret for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Configuration for the completion client.
///
/// The API key is read once at startup and passed to
/// [`CompletionClient::new`](crate::CompletionClient::new); nothing in this
/// crate reads process environment on its own.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CompletionConfig {
    /// API key for the chat completion endpoint
    #[cfg_attr(
        feature = "config",
        arg(long = "llm-api-key", env = "CAUSA_LLM_API_KEY", hide_env_values = true)
    )]
    #[serde(default, skip_serializing)]
    pub llm_api_key: Option<String>,

    /// Base URL of the chat completion API
    #[cfg_attr(
        feature = "config",
        arg(
            long = "llm-base-url",
            env = "CAUSA_LLM_BASE_URL",
            default_value = defaults::BASE_URL
        )
    )]
    #[serde(default = "default_base_url")]
    pub llm_base_url: String,

    /// Model used when a request does not name one
    #[cfg_attr(
        feature = "config",
        arg(long = "llm-model", env = "CAUSA_LLM_MODEL", default_value = defaults::MODEL)
    )]
    #[serde(default = "default_model")]
    pub llm_model: String,

    /// TCP connect timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "llm-connect-timeout",
            env = "CAUSA_LLM_CONNECT_TIMEOUT",
            default_value_t = defaults::CONNECT_TIMEOUT_SECS
        )
    )]
    #[serde(default = "default_connect_timeout")]
    pub llm_connect_timeout: u64,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "llm-user-agent", env = "CAUSA_LLM_USER_AGENT")
    )]
    #[serde(default)]
    pub llm_user_agent: Option<String>,

    /// Ask the endpoint for JSON-only output via `response_format`
    #[cfg_attr(
        feature = "config",
        arg(
            long = "llm-json-mode",
            env = "CAUSA_LLM_JSON_MODE",
            default_value_t = true,
            action = clap::ArgAction::Set
        )
    )]
    #[serde(default = "default_json_mode")]
    pub llm_json_mode: bool,
}

fn default_base_url() -> String {
    defaults::BASE_URL.to_owned()
}

fn default_model() -> String {
    defaults::MODEL.to_owned()
}

fn default_connect_timeout() -> u64 {
    defaults::CONNECT_TIMEOUT_SECS
}

fn default_json_mode() -> bool {
    true
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_base_url: default_base_url(),
            llm_model: default_model(),
            llm_connect_timeout: default_connect_timeout(),
            llm_user_agent: None,
            llm_json_mode: default_json_mode(),
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "***"))
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_connect_timeout", &self.llm_connect_timeout)
            .field("llm_user_agent", &self.llm_user_agent)
            .field("llm_json_mode", &self.llm_json_mode)
            .finish()
    }
}

impl CompletionConfig {
    /// Creates a configuration with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            llm_api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.llm_base_url = base_url.into();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.llm_model = model.into();
        self
    }

    /// Set whether JSON mode is requested.
    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.llm_json_mode = json_mode;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.llm_user_agent = Some(user_agent.into());
        self
    }

    /// Returns `true` if a usable API key is present.
    ///
    /// Callers use this to detect a missing key before attempting any call.
    pub fn is_configured(&self) -> bool {
        self.llm_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty() && !ApiKey::is_placeholder(key))
    }

    /// Returns the validated API key.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is absent or a placeholder.
    pub fn api_key(&self) -> Result<ApiKey> {
        let key = self
            .llm_api_key
            .as_deref()
            .ok_or_else(|| Error::configuration().with_message("API key is not set"))?;
        ApiKey::new(key)
    }

    /// Returns the full chat completions endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is not an absolute
    /// `http` or `https` URL.
    pub fn endpoint(&self) -> Result<Url> {
        let base = self.llm_base_url.trim_end_matches('/');
        let url = Url::parse(&format!("{base}/chat/completions")).map_err(|e| {
            Error::configuration()
                .with_message(format!("invalid base URL '{}'", self.llm_base_url))
                .with_source(e)
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(Error::configuration().with_message(format!(
                "base URL must use http or https, got '{scheme}'"
            ))),
        }
    }

    /// Returns the connect timeout as a Duration, using the default if zero.
    pub fn connect_timeout(&self) -> Duration {
        if self.llm_connect_timeout == 0 {
            Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.llm_connect_timeout)
        }
    }

    /// Returns the effective user agent, using the default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.llm_user_agent
            .clone()
            .unwrap_or_else(|| format!("causa/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found.
    pub fn validate(&self) -> Result<()> {
        self.api_key()?;
        self.endpoint()?;

        if self.llm_model.trim().is_empty() {
            return Err(Error::configuration().with_message("default model must not be empty"));
        }

        Ok(())
    }
}
