//! CSV ingest of trends-style interest exports.
//!
//! Accepted layout: an optional preamble (`Category: All categories`, blank
//! lines), then a header row whose first cell names the time axis (`Week`,
//! `Day`, `Month`, `Date`, `Time`), one column per keyword and an optional
//! `isPartial` column that is ignored.
//!
//! Design goals:
//! - **Strict schema** for the header (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **No missing values past ingest**: absent cells become zero or reject the row
//! - **Daily resolution**: hourly rows (`2024-01-07T10`) are averaged per day

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{InterestRow, InterestSeries, KeywordSet, MissingValuePolicy};
use crate::error::{AppError, SosError};

const TIME_HEADERS: [&str; 5] = ["date", "day", "week", "month", "time"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the validated series + row diagnostics.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub series: InterestSeries,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

struct Header {
    line: usize,
    /// Keyword name -> column index, in file order.
    columns: Vec<(String, usize)>,
}

/// List the keyword columns of a CSV export, in file order.
pub fn read_csv_keywords(path: &Path) -> Result<Vec<String>, AppError> {
    let records = read_records(path)?;
    let header = find_header(&records)?;
    Ok(header.columns.into_iter().map(|(name, _)| name).collect())
}

/// Load an interest series from a CSV export.
///
/// - `keywords`: columns to keep (matched case-insensitively, renamed to the
///   requested spelling, in requested order). `None` keeps every column.
/// - `window`: inclusive date range; rows outside it are skipped silently.
pub fn load_interest_csv(
    path: &Path,
    keywords: Option<&KeywordSet>,
    window: Option<(NaiveDate, NaiveDate)>,
    missing_values: MissingValuePolicy,
) -> Result<IngestedSeries, AppError> {
    let records = read_records(path)?;
    let header = find_header(&records)?;

    let selected: Vec<(String, usize)> = match keywords {
        Some(kws) => kws
            .iter()
            .map(|kw| {
                header
                    .columns
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(kw))
                    .map(|(_, idx)| (kw.to_string(), *idx))
                    .ok_or_else(|| AppError::from(SosError::MissingKeyword(kw.to_string())))
            })
            .collect::<Result<_, _>>()?,
        None => header.columns.clone(),
    };

    let mut rows: Vec<ParsedRow> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (line, record) in records.iter().filter(|(line, _)| *line > header.line) {
        let line = *line;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows_read += 1;

        match parse_row(record, &selected, missing_values) {
            Ok((row, hourly)) => {
                if let Some((start, end)) = window {
                    if row.date < start || row.date > end {
                        continue;
                    }
                }
                rows.push(ParsedRow { line, row, hourly });
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    // Exports are chronological, but hand-edited files may not be.
    rows.sort_by_key(|r| r.row.date);
    let mut days: Vec<DailyRow> = Vec::with_capacity(rows.len());
    for ParsedRow { line, row, hourly } in rows {
        if let Some(day) = days.last_mut().filter(|d| d.row.date == row.date) {
            if hourly && day.hourly {
                day.add_hour(&row.values);
            } else {
                row_errors.push(RowError {
                    line,
                    message: format!("Duplicate date {}.", row.date),
                });
            }
            continue;
        }
        days.push(DailyRow { row, hourly, hours: 1 });
    }

    let averaged = days.iter().filter(|d| d.hours > 1).count();
    if averaged > 0 {
        tracing::debug!(days = averaged, "averaged hourly rows into daily values");
    }
    let deduped: Vec<InterestRow> = days.into_iter().map(|d| d.row).collect();

    let rows_used = deduped.len();
    let names = selected.into_iter().map(|(name, _)| name).collect();
    let series = InterestSeries::new(names, deduped)?;

    Ok(IngestedSeries {
        series,
        row_errors,
        rows_read,
        rows_used,
    })
}

struct ParsedRow {
    line: usize,
    row: InterestRow,
    /// The timestamp carried a time of day.
    hourly: bool,
}

/// One output day; hourly rows fold into a running mean.
struct DailyRow {
    row: InterestRow,
    hourly: bool,
    hours: usize,
}

impl DailyRow {
    fn add_hour(&mut self, values: &[f64]) {
        self.hours += 1;
        let n = self.hours as f64;
        for (mean, v) in self.row.values.iter_mut().zip(values) {
            *mean += (v - *mean) / n;
        }
    }
}

fn read_records(path: &Path) -> Result<Vec<(usize, StringRecord)>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut out = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error: {e}")))?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(out.len() + 1);
        out.push((line, record));
    }
    Ok(out)
}

fn find_header(records: &[(usize, StringRecord)]) -> Result<Header, AppError> {
    let (line, record) = records
        .iter()
        .find(|(_, r)| {
            r.get(0)
                .map(normalize_header_name)
                .is_some_and(|h| TIME_HEADERS.contains(&h.to_ascii_lowercase().as_str()))
        })
        .ok_or_else(|| {
            AppError::new(
                2,
                "Missing header row: expected a first column named Date, Day, Week, Month, or Time.",
            )
        })?;

    let mut columns: Vec<(String, usize)> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (idx, raw) in record.iter().enumerate().skip(1) {
        let name = keyword_from_header(raw);
        if name.is_empty() || name.eq_ignore_ascii_case("ispartial") {
            continue;
        }
        if let Some(prev) = seen.insert(name.to_ascii_lowercase(), idx) {
            return Err(AppError::new(
                2,
                format!("Duplicate keyword column `{name}` (columns {} and {}).", prev + 1, idx + 1),
            ));
        }
        columns.push((name, idx));
    }

    if columns.is_empty() {
        return Err(AppError::new(2, "CSV header has no keyword columns."));
    }

    Ok(Header { line: *line, columns })
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, header detection fails.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

/// `"Adidas: (Slovakia)"` -> `"Adidas"`.
fn keyword_from_header(raw: &str) -> String {
    let name = normalize_header_name(raw);
    match name.rfind(": (") {
        Some(pos) if name.ends_with(')') => name[..pos].trim().to_string(),
        _ => name,
    }
}

fn parse_row(
    record: &StringRecord,
    selected: &[(String, usize)],
    missing_values: MissingValuePolicy,
) -> Result<(InterestRow, bool), String> {
    let raw_date = record
        .get(0)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing date.".to_string())?;
    let (date, hourly) = parse_date(raw_date)?;

    let mut values = Vec::with_capacity(selected.len());
    for (name, idx) in selected {
        let cell = record.get(*idx).map(str::trim).unwrap_or("");
        let value = match parse_interest(cell) {
            Ok(Some(v)) => v,
            Ok(None) => match missing_values {
                MissingValuePolicy::Zero => 0.0,
                MissingValuePolicy::Reject => return Err(format!("Missing value for `{name}`.")),
            },
            Err(e) => return Err(format!("Invalid value for `{name}`: {e}")),
        };
        values.push(value);
    }

    Ok((InterestRow { date, values }, hourly))
}

/// Parse one interest cell. `Ok(None)` means the cell is empty.
fn parse_interest(cell: &str) -> Result<Option<f64>, String> {
    if cell.is_empty() {
        return Ok(None);
    }
    // Trends exports write `<1` for non-zero interest that rounds to 0.
    if cell == "<1" {
        return Ok(Some(0.0));
    }
    let v = cell
        .parse::<f64>()
        .map_err(|_| format!("'{cell}' is not a number"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("'{cell}' must be finite and >= 0"));
    }
    Ok(Some(v))
}

/// Parse a row timestamp; the flag is set when it carries a time of day.
fn parse_date(s: &str) -> Result<(NaiveDate, bool), String> {
    // ISO dates are what exports emit, but spreadsheets round-trip them as
    // `DD/MM/YYYY` and friends. Monthly exports use `YYYY-MM`.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok((d, false));
        }
    }
    // Hourly exports carry a time component: `2024-01-07T10`.
    if let Some((day, _)) = s.split_once('T') {
        if let Ok(d) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            return Ok((d, true));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Ok((d, false));
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD, YYYY-MM."
    ))
}
