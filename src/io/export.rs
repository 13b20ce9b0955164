//! Export share tables to CSV.
//!
//! Values are written as percentages (`42.50%`) so the files open cleanly in
//! spreadsheets.

use std::fs::File;
use std::path::Path;

use crate::domain::{AggregatedShareSeries, ShareSeries};
use crate::error::AppError;

/// Format a share value for export: two decimals plus a percent sign.
pub fn format_percent(v: f64) -> String {
    format!("{v:.2}%")
}

/// Header + rows of an aggregated series: `period,<keyword...>`.
pub fn aggregated_table(series: &AggregatedShareSeries) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header = vec![series.granularity().as_str().to_string()];
    header.extend(series.keywords().iter().cloned());

    let rows = series
        .buckets()
        .iter()
        .map(|b| {
            let mut row = vec![b.period.label()];
            row.extend(b.values.iter().map(|v| format_percent(*v)));
            row
        })
        .collect();

    (header, rows)
}

/// Write an aggregated series to CSV.
pub fn write_aggregated_csv(path: &Path, series: &AggregatedShareSeries) -> Result<(), AppError> {
    let (header, rows) = aggregated_table(series);
    write_table(path, &header, &rows)
}

/// Write the per-timestamp share series to CSV.
pub fn write_shares_csv(path: &Path, series: &ShareSeries) -> Result<(), AppError> {
    let mut header = vec!["date".to_string()];
    header.extend(series.keywords().iter().cloned());

    let rows: Vec<Vec<String>> = series
        .rows()
        .iter()
        .map(|r| {
            let mut row = vec![r.date.format("%Y-%m-%d").to_string()];
            row.extend(r.values.iter().map(|v| format_percent(*v)));
            row
        })
        .collect();

    write_table(path, &header, &rows)
}

fn write_table(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(header)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = rows.len(), "wrote CSV export");
    Ok(())
}
