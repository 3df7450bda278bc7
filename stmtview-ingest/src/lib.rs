//! stmtview-ingest: talking to the statement analysis service

pub mod analysis;
pub mod client;
pub mod error;
pub mod readiness;

pub use analysis::{analyze_file, fetch_results, run_analysis};
pub use client::{AnalysisService, DEFAULT_BASE_URL, HttpAnalysisService, validate_upload};
pub use error::IngestError;
pub use readiness::Readiness;
