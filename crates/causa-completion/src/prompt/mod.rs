//! Ready-made prompts for the legal assistant features.
//!
//! Each preset knows how to phrase its request and which top-level shape the
//! answer must have. Callers pair [`StructuredPrompt::into_request`] with
//! [`StructuredPrompt::expected_shape`] when calling
//! [`CompletionClient::complete`](crate::CompletionClient::complete), or use
//! [`CompletionClient::run_prompt`](crate::CompletionClient::run_prompt) to do
//! both and decode the typed output.

mod analysis;
mod search;
mod transcript;

pub use analysis::{DocumentAnalysis, DocumentAnalysisPrompt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
pub use search::{LegalSearchPrompt, Precedent, SearchMode, SearchResults};
pub use transcript::{TranscriptSummary, TranscriptSummaryPrompt};

use crate::error::Result;
use crate::request::CompletionRequest;
use crate::shape::ExpectedShape;

/// A prompt with a known answer shape and output type.
pub trait StructuredPrompt {
    /// Typed form of a validated answer.
    type Output: DeserializeOwned;

    /// Builds the completion request.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error when the prompt input is blank.
    fn into_request(self) -> Result<CompletionRequest>;

    /// Returns the top-level shape every answer must satisfy.
    fn expected_shape(&self) -> ExpectedShape;
}

/// Reads an explicit `null` as the field's default value.
///
/// Models often emit `null` for a field they have nothing for. Paired with
/// `#[serde(default)]` this accepts missing and null fields alike.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
