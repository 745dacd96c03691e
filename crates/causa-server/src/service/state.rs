use causa_completion::{CompletionClient, Result};

use crate::service::ServiceConfig;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    completion: CompletionClient,
    max_body_size: usize,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the completion client cannot be built.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            completion: config.connect_completion()?,
            max_body_size: config.max_body_size,
        })
    }

    /// Creates state around an existing client.
    pub fn new(completion: CompletionClient) -> Self {
        Self {
            completion,
            max_body_size: ServiceConfig::default().max_body_size,
        }
    }

    pub fn completion(&self) -> &CompletionClient {
        &self.completion
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(completion: CompletionClient);
