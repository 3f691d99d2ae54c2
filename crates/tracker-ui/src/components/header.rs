use crate::themes::Theme;
use ratatui::text::{Line, Span};

use tracker_core::formatting::{format_number, CURRENCY_SYMBOL};

/// Bolt decoration placed either side of the application title.
pub const BOLTS: &str = "⚡ ⚡";

/// Tracker header rendering three lines:
///
/// 1. Application title between bolt decorations.
/// 2. A 60-column `=` separator.
/// 3. Unit rate and timezone in `[ ₹12.00/unit | timezone ]` format.
pub struct Header<'a> {
    pub unit_rate: f64,
    /// IANA timezone name that "today" is computed in.
    pub timezone: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(unit_rate: f64, timezone: &'a str, theme: &'a Theme) -> Self {
        Self {
            unit_rate,
            timezone,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let rate = format!("{}{}/unit", CURRENCY_SYMBOL, format_number(self.unit_rate, 2));

        vec![
            Line::from(vec![
                Span::styled(BOLTS, self.theme.header_accent),
                Span::styled(" E-BILL TRACKER ", self.theme.header),
                Span::styled(BOLTS, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(rate, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone.to_string(), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_line_count() {
        let theme = Theme::dark();
        assert_eq!(Header::new(12.0, "UTC", &theme).to_lines().len(), 3);
    }

    #[test]
    fn test_header_title() {
        let theme = Theme::dark();
        let lines = Header::new(12.0, "UTC", &theme).to_lines();
        let title = text_of(&lines[0]);
        assert!(title.contains("E-BILL TRACKER"), "got: {title}");
        assert!(title.starts_with(BOLTS));
    }

    #[test]
    fn test_header_separator() {
        let theme = Theme::dark();
        let lines = Header::new(12.0, "UTC", &theme).to_lines();
        let sep = text_of(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_rate_and_timezone() {
        let theme = Theme::dark();
        let lines = Header::new(7.5, "Asia/Kolkata", &theme).to_lines();
        let info = text_of(&lines[2]);
        assert_eq!(info, "[ ₹7.50/unit | Asia/Kolkata ]");
        assert_eq!(lines[2].spans.len(), 5);
    }
}
