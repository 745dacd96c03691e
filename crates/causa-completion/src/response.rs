//! Successful completion results.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::failure::CompletionFailure;
use crate::wire::TokenUsage;

/// Result of one completion call.
pub type CompletionResult<T = StructuredCompletion> = std::result::Result<T, CompletionFailure>;

/// A validated structured completion.
///
/// `structured` always satisfies the [`ExpectedShape`](crate::ExpectedShape)
/// the call was made with. `raw_text` is the untouched completion text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredCompletion {
    /// The parsed and validated value.
    pub structured: Value,
    /// The completion text as returned by the model.
    pub raw_text: String,
    /// Model that produced the completion, as reported by the endpoint.
    #[serde(default)]
    pub model: Option<String>,
    /// Token accounting, when reported.
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    /// Wall time from dispatch to validated result.
    #[serde(default)]
    pub elapsed: Duration,
}

impl StructuredCompletion {
    /// Returns a top-level field of the structured value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.structured.get(key)
    }

    /// Decodes the structured value into `T`.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error when the value does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.structured)
    }
}

/// A structured completion decoded into a caller type.
#[derive(Debug, Clone)]
pub struct TypedCompletion<T> {
    /// The decoded payload.
    pub data: T,
    /// The validated completion it was decoded from.
    pub completion: StructuredCompletion,
}

impl<T> TypedCompletion<T> {
    /// Returns the raw completion text.
    pub fn raw_text(&self) -> &str {
        &self.completion.raw_text
    }

    /// Discards the completion and returns the payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Hits {
        results: Vec<String>,
    }

    fn completion(structured: Value) -> StructuredCompletion {
        StructuredCompletion {
            raw_text: structured.to_string(),
            structured,
            model: None,
            usage: None,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn deserialize_into_caller_type() {
        let completion = completion(json!({"results": ["a", "b"]}));
        let hits: Hits = completion.deserialize().unwrap();
        assert_eq!(hits.results, vec!["a", "b"]);
    }

    #[test]
    fn deserialize_reports_type_mismatch() {
        let completion = completion(json!({"results": [1]}));
        assert!(completion.deserialize::<Hits>().is_err());
    }

    #[test]
    fn get_reads_top_level_fields() {
        let completion = completion(json!({"results": []}));
        assert_eq!(completion.get("results"), Some(&json!([])));
        assert!(completion.get("missing").is_none());
    }
}
