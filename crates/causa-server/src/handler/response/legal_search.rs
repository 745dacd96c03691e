use causa_completion::prompt::{Precedent, SearchMode, SearchResults};
use serde::{Deserialize, Serialize};

/// Response body for `POST /api/legal-search`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalSearchResponse {
    pub results: Vec<Precedent>,
    pub mode: SearchMode,
}

impl LegalSearchResponse {
    pub fn new(results: SearchResults, mode: SearchMode) -> Self {
        Self {
            results: results.results,
            mode,
        }
    }
}
