//! Request bodies.

mod document_analysis;
mod legal_search;
mod transcript_summary;
mod validations;

pub use document_analysis::DocumentAnalysisRequest;
pub use legal_search::LegalSearchRequest;
pub use transcript_summary::TranscriptSummaryRequest;
