//! Document analysis prompt.

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{StructuredPrompt, null_as_default};
use crate::error::{Error, Result};
use crate::request::CompletionRequest;
use crate::shape::{ExpectedShape, ValueKind};

/// Typed answer of a [`DocumentAnalysisPrompt`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentAnalysis {
    pub resumo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pontos_chave: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub riscos: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub prazos: Vec<String>,
}

/// Summarises a legal document and lists its key points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAnalysisPrompt {
    text: String,
    instructions: Option<String>,
    deadline: Duration,
}

impl DocumentAnalysisPrompt {
    const SYSTEM_INSTRUCTION: &'static str = "Você é um advogado brasileiro experiente que \
         analisa documentos jurídicos. Responda em português.";

    /// Default deadline for an analysis.
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            instructions: None,
            deadline: Self::DEFAULT_DEADLINE,
        }
    }

    /// Adds caller instructions, e.g. which clauses to focus on.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into()).filter(|i: &String| !i.trim().is_empty());
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    fn user_prompt(&self) -> String {
        let mut prompt = String::from(
            "Analise o documento abaixo e retorne:\n\
             {\"resumo\": \"...\", \"pontos_chave\": [\"...\"], \"riscos\": [\"...\"], \
             \"prazos\": [\"...\"]}\n",
        );

        if let Some(instructions) = &self.instructions {
            prompt.push_str("\nInstruções adicionais: ");
            prompt.push_str(instructions.trim());
            prompt.push('\n');
        }

        prompt.push_str("\nDocumento:\n");
        prompt.push_str(self.text.trim());
        prompt
    }
}

impl StructuredPrompt for DocumentAnalysisPrompt {
    type Output = DocumentAnalysis;

    fn into_request(self) -> Result<CompletionRequest> {
        if self.text.trim().is_empty() {
            return Err(Error::invalid_input().with_message("document text must not be empty"));
        }

        Ok(CompletionRequest::builder()
            .with_prompt(self.user_prompt())
            .with_system_instruction(Self::SYSTEM_INSTRUCTION)
            .with_deadline(self.deadline)
            .with_max_output_tokens(4096u32)
            .build()?)
    }

    fn expected_shape(&self) -> ExpectedShape {
        ExpectedShape::new()
            .require("resumo", ValueKind::String)
            .require("pontos_chave", ValueKind::Array)
    }
}
