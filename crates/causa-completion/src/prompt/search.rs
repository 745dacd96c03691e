//! Jurisprudence search prompt.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use super::{StructuredPrompt, null_as_default};
use crate::error::{Error, Result};
use crate::request::CompletionRequest;
use crate::shape::ExpectedShape;

/// How thorough a search should be.
///
/// The mode picks both the deadline and how many precedents are requested.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema
)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Quick,
    Deep,
}

impl SearchMode {
    /// Returns the hard deadline for a search in this mode.
    pub fn deadline(self) -> Duration {
        match self {
            Self::Quick => Duration::from_secs(10),
            Self::Deep => Duration::from_secs(30),
        }
    }

    /// Returns the number of precedents asked for.
    pub fn result_count(self) -> usize {
        match self {
            Self::Quick => 5,
            Self::Deep => 10,
        }
    }

    fn max_output_tokens(self) -> u32 {
        match self {
            Self::Quick => 2048,
            Self::Deep => 4096,
        }
    }
}

/// One court decision returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Precedent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub titulo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tribunal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ementa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevancia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Typed answer of a [`LegalSearchPrompt`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResults {
    pub results: Vec<Precedent>,
}

/// Asks for Brazilian case law relevant to a free-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalSearchPrompt {
    query: String,
    mode: SearchMode,
}

impl LegalSearchPrompt {
    const SYSTEM_INSTRUCTION: &'static str = "Você é um assistente jurídico especializado em \
         jurisprudência brasileira. Cite apenas decisões reais de tribunais brasileiros. \
         Responda em português.";

    /// Creates a quick search for `query`.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: SearchMode::Quick,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    fn user_prompt(&self) -> String {
        format!(
            "Pesquise jurisprudência sobre: {query}\n\n\
             Retorne até {count} decisões no formato:\n\
             {{\"results\": [{{\"titulo\": \"...\", \"tribunal\": \"...\", \"ementa\": \"...\", \
             \"data\": \"...\", \"numero\": \"...\", \"relevancia\": \"...\", \"link\": \"...\"}}]}}\n\
             Se nada for encontrado, retorne {{\"results\": []}}.",
            query = self.query.trim(),
            count = self.mode.result_count(),
        )
    }
}

impl StructuredPrompt for LegalSearchPrompt {
    type Output = SearchResults;

    fn into_request(self) -> Result<CompletionRequest> {
        if self.query.trim().is_empty() {
            return Err(Error::invalid_input().with_message("search query must not be empty"));
        }

        Ok(CompletionRequest::builder()
            .with_prompt(self.user_prompt())
            .with_system_instruction(Self::SYSTEM_INSTRUCTION)
            .with_deadline(self.mode.deadline())
            .with_max_output_tokens(self.mode.max_output_tokens())
            .build()?)
    }

    fn expected_shape(&self) -> ExpectedShape {
        ExpectedShape::array("results")
    }
}
