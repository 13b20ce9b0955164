//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - share over time: one marker letter per keyword, `.` connecting lines
//! - year snapshots: horizontal `#` bars scaled to 100%

use crate::domain::{AggregatedShareSeries, YearlySnapshot};
use crate::sos::PeriodComparison;

const SYMBOLS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// Line chart of each keyword's share across buckets (y axis fixed to 0..100%).
pub fn render_share_lines(series: &AggregatedShareSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let buckets = series.buckets();
    let (Some(first), Some(last)) = (buckets.first(), buckets.last()) else {
        return "Plot: no data\n".to_string();
    };

    let mut grid = vec![vec![' '; width]; height];
    let n = buckets.len();

    // Connecting lines first so markers can overlay them.
    for col in 0..series.keywords().len() {
        let mut prev = None;
        for (i, b) in buckets.iter().enumerate() {
            let x = map_x(i, n, width);
            let y = map_y(b.values[col], 0.0, 100.0, height);
            if let Some((x0, y0)) = prev {
                draw_line(&mut grid, x0, y0, x, y, '.');
            }
            prev = Some((x, y));
        }
    }
    for col in 0..series.keywords().len() {
        let ch = SYMBOLS[col % SYMBOLS.len()];
        for (i, b) in buckets.iter().enumerate() {
            grid[map_y(b.values[col], 0.0, 100.0, height)][map_x(i, n, width)] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}..{} ({}) | share=[0, 100]%\n",
        first.period,
        last.period,
        series.granularity()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = series
        .keywords()
        .iter()
        .enumerate()
        .map(|(i, kw)| format!("{}={kw}", SYMBOLS[i % SYMBOLS.len()]))
        .collect();
    out.push_str(&format!("Legend: {}\n", legend.join("  ")));

    out
}

/// Horizontal bars of one year's mean shares.
pub fn render_snapshot_bars(snapshot: &YearlySnapshot, width: usize) -> String {
    let width = width.max(10);
    let label_width = snapshot
        .keywords
        .iter()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);

    let mut out = format!("Average SoS {} ({} rows)\n", snapshot.year, snapshot.rows);
    for (kw, v) in snapshot.iter() {
        let filled = ((v.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
        out.push_str(&format!(
            "{:<label_width$} |{}{}| {v:>6.2}%\n",
            truncate(kw, label_width),
            "#".repeat(filled),
            " ".repeat(width - filled),
        ));
    }
    out
}

/// Bars for the current and previous year, or a note when a year has no data.
pub fn render_comparison_bars(comparison: &PeriodComparison, width: usize) -> String {
    let mut out = String::new();
    for (year, snap) in [
        (comparison.current_year, comparison.current.as_ref()),
        (comparison.previous_year(), comparison.previous.as_ref()),
    ] {
        match snap {
            Some(s) => out.push_str(&render_snapshot_bars(s, width)),
            None => out.push_str(&format!("No data available for {year}.\n")),
        }
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bucket, Granularity};
    use chrono::NaiveDate;

    fn month(m: u32) -> crate::domain::Period {
        Granularity::Month.period_of(NaiveDate::from_ymd_opt(2024, m, 1).unwrap())
    }

    #[test]
    fn share_lines_golden_snapshot_small() {
        let series = AggregatedShareSeries::new(
            Granularity::Month,
            vec!["Adidas".to_string(), "Nike".to_string()],
            vec![
                Bucket { period: month(1), values: vec![100.0, 0.0], rows: 4 },
                Bucket { period: month(2), values: vec![100.0, 0.0], rows: 4 },
            ],
        )
        .unwrap();

        let txt = render_share_lines(&series, 10, 5);
        let expected = concat!(
            "Plot: 2024-01..2024-02 (month) | share=[0, 100]%\n",
            "A........A\n",
            "          \n",
            "          \n",
            "          \n",
            "B........B\n",
            "Legend: A=Adidas  B=Nike\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn share_lines_without_buckets() {
        let series = AggregatedShareSeries::new(Granularity::Year, vec!["A".to_string()], vec![]).unwrap();
        assert_eq!(render_share_lines(&series, 40, 10), "Plot: no data\n");
    }

    #[test]
    fn snapshot_bars_scale_to_width() {
        let snap = YearlySnapshot {
            year: 2024,
            keywords: vec!["Adidas".to_string(), "Nike".to_string()],
            values: vec![25.0, 75.0],
            rows: 52,
        };
        let txt = render_snapshot_bars(&snap, 20);
        let expected = concat!(
            "Average SoS 2024 (52 rows)\n",
            "Adidas |#####               |  25.00%\n",
            "Nike   |###############     |  75.00%\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn comparison_notes_missing_year() {
        let cmp = PeriodComparison {
            current_year: 2025,
            current: None,
            previous: None,
        };
        let txt = render_comparison_bars(&cmp, 20);
        assert!(txt.contains("No data available for 2025."));
        assert!(txt.contains("No data available for 2024."));
    }
}
