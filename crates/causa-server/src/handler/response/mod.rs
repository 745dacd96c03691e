//! Response bodies.

mod document_analysis;
mod error_response;
mod legal_search;
mod monitor;
mod transcript_summary;

pub use document_analysis::DocumentAnalysisResponse;
pub use error_response::ErrorResponse;
pub use legal_search::LegalSearchResponse;
pub use monitor::MonitorStatusResponse;
pub use transcript_summary::TranscriptSummaryResponse;
