//! Consumption trend bar chart for the analytics tab.

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

use tracker_core::formatting::format_number;
use tracker_core::models::Bucket;
use tracker_core::time_utils::month_name;

use crate::themes::Theme;

/// Widest label a bar keeps before truncation.
const MAX_LABEL_CHARS: usize = 12;

/// Bars cannot go below zero; negative buckets draw as empty bars
/// but keep their signed value as the text.
pub fn bar_height(units: f64) -> u64 {
    if units.is_finite() && units > 0.0 {
        units.round() as u64
    } else {
        0
    }
}

/// Compact bar label that keeps the year visible: month names are
/// abbreviated and "1st week" becomes "W1". Labels still too wide (custom
/// ranges) fall back to the period's starting month.
fn short_label(bucket: &Bucket) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut iter = bucket.label.split_whitespace().peekable();
    while let Some(word) = iter.next() {
        if iter.peek() == Some(&"week") {
            let digits: String = word.chars().take_while(|c| c.is_ascii_digit()).collect();
            words.push(format!("W{}", digits));
            iter.next();
        } else {
            words.push(abbreviate_month(word).to_string());
        }
    }
    let label = words.join(" ");
    if label.chars().count() <= MAX_LABEL_CHARS {
        label
    } else {
        bucket.start.format("%b %Y").to_string()
    }
}

fn abbreviate_month(word: &str) -> &str {
    match (1..=12u32).find(|m| month_name(*m) == word) {
        Some(_) => word.get(..3).unwrap_or(word),
        None => word,
    }
}

pub fn render_usage_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    buckets: &[Bucket],
    theme: &Theme,
) {
    let bars: Vec<Bar> = buckets
        .iter()
        .map(|b| {
            Bar::default()
                .value(bar_height(b.total_units))
                .text_value(format_number(b.total_units, 1))
                .label(Line::from(short_label(b)))
                .style(if b.warnings > 0 {
                    theme.warning
                } else {
                    theme.chart_bar
                })
                .value_style(theme.chart_value)
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(MAX_LABEL_CHARS as u16)
        .bar_gap(1)
        .label_style(theme.label);

    frame.render_widget(chart, area);
}
