use causa_completion::prompt::DocumentAnalysisPrompt;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::not_blank;

/// Request body for `POST /api/document-analysis`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysisRequest {
    /// Extracted document text.
    #[validate(
        custom(function = "not_blank", message = "Document text must not be empty"),
        length(max = 200000, message = "Document text must be at most 200000 characters long")
    )]
    pub text: String,
    /// Optional focus for the analysis.
    #[serde(default)]
    #[validate(length(max = 2000, message = "Instructions must be at most 2000 characters long"))]
    pub instructions: Option<String>,
}

impl DocumentAnalysisRequest {
    pub fn into_prompt(self) -> DocumentAnalysisPrompt {
        let prompt = DocumentAnalysisPrompt::new(self.text);
        match self.instructions {
            Some(instructions) => prompt.with_instructions(instructions),
            None => prompt,
        }
    }
}
