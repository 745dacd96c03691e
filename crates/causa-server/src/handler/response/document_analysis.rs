use causa_completion::prompt::DocumentAnalysis;
use serde::{Deserialize, Serialize};

/// Response body for `POST /api/document-analysis`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysisResponse {
    pub analysis: DocumentAnalysis,
}
