//! Structural recovery of a JSON object from free-form completion text.
//!
//! Models wrap JSON in commentary or markdown fences even when told not to.
//! Recovery runs before parsing and narrows the text to the span most likely
//! to hold the payload. It never parses or rewrites the text itself.

use std::fmt;

/// Returns the slice from the first `{` to the last `}` inclusive.
///
/// Returns `None` when the text holds no such span. Applying this to its own
/// output yields the same slice.
///
/// ```rust
/// use causa_completion::extract_json_span;
///
/// let text = "Aqui está:\n```json\n{\"results\": []}\n```";
/// assert_eq!(extract_json_span(text), Some("{\"results\": []}"));
/// assert_eq!(extract_json_span("no braces"), None);
/// ```
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// A pre-parse recovery stage.
pub trait JsonRecovery: fmt::Debug + Send + Sync {
    /// Narrows `text` to the candidate JSON object, or `None` if there is none.
    fn recover<'a>(&self, text: &'a str) -> Option<&'a str>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// First `{` to last `}`. The default stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct BraceSpan;

impl JsonRecovery for BraceSpan {
    fn recover<'a>(&self, text: &'a str) -> Option<&'a str> {
        extract_json_span(text)
    }

    fn name(&self) -> &'static str {
        "brace_span"
    }
}

/// Prefers the body of a ```` ```json ```` fenced block, then falls back to
/// [`BraceSpan`] over the whole text.
///
/// Useful when the model adds a second, illustrative object in its commentary
/// after the real payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct FencedBlock;

impl FencedBlock {
    const OPEN: &'static str = "```json";
    const CLOSE: &'static str = "```";

    fn fenced_body(text: &str) -> Option<&str> {
        let open = text.find(Self::OPEN)?;
        let rest = &text[open + Self::OPEN.len()..];
        let close = rest.find(Self::CLOSE)?;
        Some(&rest[..close])
    }
}

impl JsonRecovery for FencedBlock {
    fn recover<'a>(&self, text: &'a str) -> Option<&'a str> {
        Self::fenced_body(text)
            .and_then(extract_json_span)
            .or_else(|| extract_json_span(text))
    }

    fn name(&self) -> &'static str {
        "fenced_block"
    }
}
