use causa_completion::prompt::TranscriptSummary;
use serde::{Deserialize, Serialize};

/// Response body for `POST /api/transcript-summary`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSummaryResponse {
    pub summary: TranscriptSummary,
}
