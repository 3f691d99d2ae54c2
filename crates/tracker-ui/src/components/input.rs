use ratatui::layout::{Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

/// Character shown in place of each typed character of a masked field.
pub const MASK_CHAR: char = '•';

// ── TextField ─────────────────────────────────────────────────────────────────

/// A single-line text input that only ever appends or deletes at the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    /// Render `MASK_CHAR` instead of the typed text.
    pub masked: bool,
}

impl TextField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn push(&mut self, c: char) {
        if !c.is_control() {
            self.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Text as it appears on screen.
    pub fn display_value(&self) -> String {
        if self.masked {
            std::iter::repeat(MASK_CHAR)
                .take(self.value.chars().count())
                .collect()
        } else {
            self.value.clone()
        }
    }

    /// Terminal columns occupied by the displayed text.
    pub fn display_width(&self) -> u16 {
        UnicodeWidthStr::width(self.display_value().as_str()).min(u16::MAX as usize) as u16
    }

    /// Draw the field as a bordered box; when `focused`, place the cursor
    /// after the last character.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let style = if focused {
            theme.input_focused
        } else {
            theme.input_idle
        };

        let content = if self.value.is_empty() && !focused {
            Line::from(Span::styled(self.placeholder.clone(), theme.dim))
        } else {
            Line::from(Span::styled(self.display_value(), style))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(format!(" {} ", self.label));
        frame.render_widget(Paragraph::new(content).block(block), area);

        if focused && area.width > 2 && area.height > 2 {
            let max_x = area.x + area.width - 2;
            let x = (area.x + 1).saturating_add(self.display_width()).min(max_x);
            frame.set_cursor_position(Position::new(x, area.y + 1));
        }
    }
}
