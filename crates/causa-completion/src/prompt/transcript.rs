use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{StructuredPrompt, null_as_default};
use crate::error::{Error, Result};
use crate::request::CompletionRequest;
use crate::shape::{ExpectedShape, ValueKind};

/// Typed answer of a [`TranscriptSummaryPrompt`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSummary {
    pub resumo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topicos: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub encaminhamentos: Vec<String>,
}

/// Summarises a hearing or meeting transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSummaryPrompt {
    transcript: String,
    deadline: Duration,
}

impl TranscriptSummaryPrompt {
    const SYSTEM_INSTRUCTION: &'static str = "Você resume transcrições de audiências e \
         reuniões jurídicas. Responda em português.";

    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            deadline: Self::DEFAULT_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

impl StructuredPrompt for TranscriptSummaryPrompt {
    type Output = TranscriptSummary;

    fn into_request(self) -> Result<CompletionRequest> {
        let transcript = self.transcript.trim();
        if transcript.is_empty() {
            return Err(Error::invalid_input().with_message("transcript must not be empty"));
        }

        let prompt = format!(
            "Resuma a transcrição abaixo e retorne:\n\
             {{\"resumo\": \"...\", \"topicos\": [\"...\"], \"encaminhamentos\": [\"...\"]}}\n\n\
             Transcrição:\n{transcript}"
        );

        Ok(CompletionRequest::builder()
            .with_prompt(prompt)
            .with_system_instruction(Self::SYSTEM_INSTRUCTION)
            .with_deadline(self.deadline)
            .build()?)
    }

    fn expected_shape(&self) -> ExpectedShape {
        ExpectedShape::new()
            .require("resumo", ValueKind::String)
            .require("topicos", ValueKind::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_deadline_is_used() {
        let request = TranscriptSummaryPrompt::new("Juiz: aberta a audiência.")
            .with_deadline(Duration::from_secs(5))
            .into_request()
            .unwrap();
        assert_eq!(request.deadline(), Duration::from_secs(5));
        assert!(request.prompt().contains("aberta a audiência"));
    }

    #[test]
    fn blank_transcript_is_rejected() {
        let error = TranscriptSummaryPrompt::new("").into_request().unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn null_follow_ups_decode_as_empty() {
        let summary: TranscriptSummary = serde_json::from_value(serde_json::json!({
            "resumo": "Audiência de conciliação",
            "topicos": ["acordo"],
            "encaminhamentos": null
        }))
        .unwrap();

        assert!(summary.encaminhamentos.is_empty());
    }
}
