//! Request extractors with JSON error bodies.

mod json;
mod validated_json;

pub use json::Json;
pub use validated_json::ValidateJson;
