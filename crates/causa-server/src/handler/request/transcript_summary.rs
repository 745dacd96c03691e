use causa_completion::prompt::TranscriptSummaryPrompt;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::not_blank;

/// Request body for `POST /api/transcript-summary`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSummaryRequest {
    #[validate(
        custom(function = "not_blank", message = "Transcript must not be empty"),
        length(max = 200000, message = "Transcript must be at most 200000 characters long")
    )]
    pub transcript: String,
}

impl TranscriptSummaryRequest {
    pub fn into_prompt(self) -> TranscriptSummaryPrompt {
        TranscriptSummaryPrompt::new(self.transcript)
    }
}
