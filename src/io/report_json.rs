//! Write a full analysis report as JSON.
//!
//! The JSON report is the "portable" form of a run: request metadata plus
//! every derived view (shares, aggregates, yearly snapshots, YoY changes).
//! YoY changes that are undefined are simply missing from `yoy.entries`.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::data::FetchRequest;
use crate::domain::{AggregatedShareSeries, ShareSeries, YoyTable};
use crate::error::AppError;
use crate::sos::PeriodComparison;

#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub tool: &'static str,
    pub provider: &'a str,
    pub request: &'a FetchRequest,
    pub raw_rows: usize,
    pub comparison: &'a PeriodComparison,
    pub aggregated: &'a AggregatedShareSeries,
    pub yearly: &'a AggregatedShareSeries,
    pub yoy: &'a YoyTable,
    pub shares: &'a ShareSeries,
}

impl<'a> AnalysisReport<'a> {
    pub fn from_run(run: &'a RunOutput) -> Self {
        Self {
            tool: "sos",
            provider: &run.provider,
            request: &run.request,
            raw_rows: run.raw_rows,
            comparison: &run.comparison,
            aggregated: &run.aggregated,
            yearly: &run.yearly,
            yoy: &run.yoy,
            shares: &run.shares,
        }
    }
}

/// Write the report for `run` as pretty-printed JSON.
pub fn write_report_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &AnalysisReport::from_run(run))
        .map_err(|e| AppError::new(4, format!("Failed to write report JSON: {e}")))?;

    tracing::info!(path = %path.display(), "wrote JSON report");
    Ok(())
}
