//! Reading history and period bucket tables.
//!
//! Both render a bordered [`ratatui::widgets::Table`]; the bucket table adds
//! a highlighted totals row at the bottom.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use tracker_core::billing::estimate_cost;
use tracker_core::formatting;
use tracker_core::models::{Bucket, DateRange, DeltaWarning, Reading};
use tracker_data::aggregator::compute_consumption;

use crate::themes::Theme;

// ── History ───────────────────────────────────────────────────────────────────

/// One reading with the consumption since the reading before it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub value: f64,
    /// `None` for the first reading in the log.
    pub delta_units: Option<f64>,
    pub cost: Option<f64>,
    pub warning: Option<DeltaWarning>,
}

/// Build history rows, newest first.
///
/// Deltas are computed over the whole log before `range` is applied, so the
/// first row inside a filtered window still shows its consumption.
pub fn build_history_rows(
    readings: &[Reading],
    range: Option<&DateRange>,
    unit_rate: f64,
) -> Vec<HistoryRow> {
    let mut sorted = readings.to_vec();
    sorted.sort_by_key(|r| r.date);
    let entries = compute_consumption(&sorted);

    let mut rows: Vec<HistoryRow> = sorted
        .iter()
        .enumerate()
        .map(|(i, reading)| {
            let entry = i.checked_sub(1).and_then(|prev| entries.get(prev));
            HistoryRow {
                date: reading.date,
                value: reading.value,
                delta_units: entry.map(|e| e.delta_units),
                cost: entry.map(|e| estimate_cost(e.delta_units, unit_rate)),
                warning: entry.and_then(|e| e.warning),
            }
        })
        .filter(|row| range.map_or(true, |r| r.contains(row.date)))
        .collect();

    rows.reverse();
    rows
}

pub fn render_history_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[HistoryRow],
    theme: &Theme,
) {
    let header_cells = ["Date", "Reading", "Consumed", "Cost", "Note"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if row.warning.is_some() {
                theme.table_flagged
            } else if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let dash = || "-".to_string();
            Row::new(vec![
                Cell::from(formatting::format_date(row.date)),
                Cell::from(formatting::format_number(row.value, 2)),
                Cell::from(row.delta_units.map_or_else(dash, formatting::format_units)),
                Cell::from(row.cost.map_or_else(dash, formatting::format_currency)),
                Cell::from(row.warning.map(|w| w.message()).unwrap_or_default()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Min(20),
    ];

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

// ── Buckets ───────────────────────────────────────────────────────────────────

/// Sums across a set of buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketTotals {
    pub total_units: f64,
    pub total_cost: f64,
    pub periods: usize,
    pub warnings: u32,
}

impl BucketTotals {
    pub fn from_buckets(buckets: &[Bucket]) -> Self {
        Self {
            total_units: buckets.iter().map(|b| b.total_units).sum(),
            total_cost: buckets.iter().map(|b| b.total_cost).sum(),
            periods: buckets.len(),
            warnings: buckets.iter().map(|b| b.warnings).sum(),
        }
    }
}

/// Render one row per bucket followed by a totals row.
pub fn render_bucket_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    buckets: &[Bucket],
    theme: &Theme,
) {
    let header_cells = ["Period", "Consumed", "Cost", "Readings", "Warnings"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let mut all_rows: Vec<Row> = buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let style = if bucket.warnings > 0 {
                theme.table_flagged
            } else if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(bucket.label.clone()),
                Cell::from(formatting::format_units(bucket.total_units)),
                Cell::from(formatting::format_currency(bucket.total_cost)),
                Cell::from(bucket.entries.to_string()),
                Cell::from(bucket.warnings.to_string()),
            ])
            .style(style)
        })
        .collect();

    let totals = BucketTotals::from_buckets(buckets);
    all_rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(formatting::format_units(totals.total_units)),
            Cell::from(formatting::format_currency(totals.total_cost)),
            Cell::from(format!("{} periods", totals.periods)),
            Cell::from(totals.warnings.to_string()),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Min(24),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder shown when a view has nothing to display.
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, hint: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No readings found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(hint.to_string(), theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn r(y: i32, m: u32, day: u32, value: f64) -> Reading {
        Reading::new(d(y, m, day), value).unwrap()
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_history_rows_newest_first_with_deltas() {
        let readings = vec![r(2024, 1, 1, 100.0), r(2024, 1, 15, 150.0), r(2024, 2, 1, 130.0)];
        let rows = build_history_rows(&readings, None, 12.0);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, d(2024, 2, 1));
        assert_eq!(rows[0].delta_units, Some(-20.0));
        assert!(rows[0].warning.is_some());
        assert_eq!(rows[1].cost, Some(600.0));
        assert_eq!(rows[2].delta_units, None);
    }

    #[test]
    fn test_history_rows_filtered_keep_cross_boundary_delta() {
        let readings = vec![r(2024, 1, 20, 100.0), r(2024, 2, 5, 130.0)];
        let range = DateRange::for_month_of(d(2024, 2, 1));
        let rows = build_history_rows(&readings, Some(&range), 10.0);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].delta_units, Some(30.0));
        assert_eq!(rows[0].cost, Some(300.0));
    }

    #[test]
    fn test_bucket_totals() {
        let bucket = |units: f64, warnings: u32| Bucket {
            label: "x".into(),
            start: d(2024, 1, 1),
            end: d(2024, 1, 31),
            total_units: units,
            total_cost: units * 12.0,
            entries: 1,
            warnings,
        };
        let totals = BucketTotals::from_buckets(&[bucket(50.0, 0), bucket(-20.0, 1)]);
        assert_eq!(totals.total_units, 30.0);
        assert_eq!(totals.total_cost, 360.0);
        assert_eq!(totals.periods, 2);
        assert_eq!(totals.warnings, 1);
    }

    #[test]
    fn test_render_bucket_table_has_total_row() {
        let backend = TestBackend::new(90, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let buckets = vec![Bucket {
            label: "January 2024".into(),
            start: d(2024, 1, 1),
            end: d(2024, 1, 31),
            total_units: 50.0,
            total_cost: 600.0,
            entries: 2,
            warnings: 0,
        }];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_bucket_table(frame, area, "Monthly", &buckets, &theme);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("January 2024"));
        assert!(text.contains("₹600.00"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("1 periods"));
    }

    #[test]
    fn test_render_history_table_shows_warning() {
        let backend = TestBackend::new(120, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let rows = build_history_rows(&[r(2024, 1, 1, 100.0), r(2024, 1, 2, 90.0)], None, 12.0);

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_history_table(frame, area, "History", &rows, &theme)
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("02-01-2024"));
        assert!(text.contains("-10.00 units"));
        assert!(text.contains("meter reading decreased"));
    }

    #[test]
    fn test_render_no_data() {
        let backend = TestBackend::new(50, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, "History", "Log a reading first.", &theme)
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("No readings found"));
        assert!(text.contains("Log a reading first."));
    }
}
