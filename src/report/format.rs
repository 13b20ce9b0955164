//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the share transforms stay clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::domain::{AggregatedShareSeries, YoyTable};
use crate::sos::PeriodComparison;

/// Format the run summary (request + dataset stats).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();
    let req = &run.request;

    out.push_str("=== sos - Share of Search ===\n");
    out.push_str(&format!("Keywords: {}\n", req.keywords));
    out.push_str(&format!("Source: {}\n", run.provider));
    out.push_str(&format!(
        "Timeframe: {} | region={} | language={}\n",
        req.timeframe(),
        req.region,
        req.language
    ));

    let dropped = run.raw_rows - run.shares.len();
    out.push_str(&format!(
        "Rows: raw={} | with data={} | dropped (no interest)={}\n",
        run.raw_rows,
        run.shares.len(),
        dropped
    ));
    if let Some((first, last)) = run.shares.date_range() {
        out.push_str(&format!("Data range: {first} .. {last}\n"));
    }
    out.push('\n');

    out
}

/// Current vs previous year snapshot table.
pub fn format_comparison(comparison: &PeriodComparison) -> String {
    let mut out = String::new();
    let cur = comparison.current_year;
    let prev = comparison.previous_year();

    out.push_str(&format!("Share of Search: {cur} vs {prev}\n"));

    let keywords = match (&comparison.current, &comparison.previous) {
        (Some(s), _) | (None, Some(s)) => s.keywords.clone(),
        (None, None) => {
            out.push_str(&format!("No data available for {cur} or {prev}.\n"));
            return out;
        }
    };

    let fmt_cell = |snap: Option<&crate::domain::YearlySnapshot>, kw: &str| {
        snap.and_then(|s| s.get(kw))
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string())
    };

    out.push_str(&format!("{:<20} {:>10} {:>10} {:>10}\n", "keyword", cur, prev, "diff (pp)"));
    out.push_str(&format!("{:-<20} {:-<10} {:-<10} {:-<10}\n", "", "", "", ""));
    for kw in &keywords {
        let c = comparison.current.as_ref().and_then(|s| s.get(kw));
        let p = comparison.previous.as_ref().and_then(|s| s.get(kw));
        let diff = match (c, p) {
            (Some(c), Some(p)) => format!("{:+.2}", c - p),
            _ => "-".to_string(),
        };
        out.push_str(&format!(
            "{:<20} {:>10} {:>10} {:>10}\n",
            truncate(kw, 20),
            fmt_cell(comparison.current.as_ref(), kw.as_str()),
            fmt_cell(comparison.previous.as_ref(), kw.as_str()),
            diff
        ));
    }

    out
}

/// Aggregated shares: one row per bucket, one column per keyword.
pub fn format_aggregated_table(series: &AggregatedShareSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} Share of Search (%)\n", series.granularity().display_name()));

    if series.is_empty() {
        out.push_str("No data.\n");
        return out;
    }

    let mut header = format!("{:<10}", "period");
    let mut rule = format!("{:-<10}", "");
    for kw in series.keywords() {
        header.push_str(&format!(" {:>12}", truncate(kw, 12)));
        rule.push_str(&format!(" {:-<12}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for b in series.buckets() {
        let mut line = format!("{:<10}", b.period.label());
        for v in &b.values {
            line.push_str(&format!(" {v:>12.2}"));
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Yearly shares and YoY changes, one row per keyword, years newest first.
///
/// Columns alternate `SoS <year>` / `YoY <year>`; undefined changes print `-`.
pub fn format_yoy_table(yearly: &AggregatedShareSeries, yoy: &YoyTable) -> String {
    let mut out = String::new();
    out.push_str("Yearly Share of Search and year-over-year change\n");

    let columns = yoy.interleaved_columns(yearly);
    if columns.is_empty() {
        out.push_str("No data.\n");
        return out;
    }

    let mut header = format!("{:<20}", "keyword");
    for c in &columns {
        header.push_str(&format!(" {:>9} {:>9}", format!("SoS {}", c.year), format!("YoY {}", c.year)));
    }
    out.push_str(&header);
    out.push('\n');

    for (col, kw) in yearly.keywords().iter().enumerate() {
        let mut line = format!("{:<20}", truncate(kw, 20));
        for c in &columns {
            let yoy = c.yoy[col]
                .map(|v| format!("{v:+.2}%"))
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {:>9.2} {:>9}", c.shares[col], yoy));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("SoS = average yearly share of search. YoY = change against the previous year.\n");

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
