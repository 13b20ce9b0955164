//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - share table exports to CSV (`export`)
//! - full analysis report as JSON (`report_json`)

pub mod export;
pub mod ingest;
pub mod report_json;

pub use export::*;
pub use ingest::*;
pub use report_json::*;
