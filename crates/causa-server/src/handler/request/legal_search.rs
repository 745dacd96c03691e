use causa_completion::prompt::{LegalSearchPrompt, SearchMode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validations::not_blank;

/// Request body for `POST /api/legal-search`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LegalSearchRequest {
    /// Free-text description of the legal question.
    #[validate(
        custom(function = "not_blank", message = "Search query must not be empty"),
        length(max = 2000, message = "Search query must be at most 2000 characters long")
    )]
    pub query: String,
    /// Quick (default) or deep search.
    #[serde(default)]
    pub mode: SearchMode,
}

impl LegalSearchRequest {
    pub fn into_prompt(self) -> LegalSearchPrompt {
        LegalSearchPrompt::new(self.query).with_mode(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn mode_defaults_to_quick() {
        let request: LegalSearchRequest =
            serde_json::from_value(json!({"query": "dano moral"})).unwrap();
        assert_eq!(request.mode, SearchMode::Quick);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn blank_query_fails_validation() {
        let request: LegalSearchRequest =
            serde_json::from_value(json!({"query": "  ", "mode": "deep"})).unwrap();
        assert!(request.validate().is_err());
    }
}
