//! Category bar: the strip of search categories at the top of the screen.

use crate::theme::Theme;
use cdm_core::Category;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Tabs, Widget},
};

/// Renders the 1-line category strip. The active category is highlighted and
/// a status message (or the keybinding hints) is right-aligned in the same
/// row.
pub struct CategoryBar<'a> {
    active: Category,
    status: Option<&'a (String, bool)>,
    theme: &'a Theme,
}

impl<'a> CategoryBar<'a> {
    /// `status` is `(message, is_error)`.
    pub fn new(active: Category, status: Option<&'a (String, bool)>, theme: &'a Theme) -> Self {
        Self { active, status, theme }
    }
}

impl Widget for CategoryBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let labels: Vec<Line> = Category::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| Line::from(format!(" {}:{} ", i + 1, c.label())))
            .collect();

        Tabs::new(labels)
            .select(self.active.index())
            .style(self.theme.category_inactive)
            .highlight_style(self.theme.category_active)
            .divider("")
            .render(area, buf);

        let (hint, style) = match self.status {
            Some((msg, true)) => (format!(" {msg} "), self.theme.status_error),
            Some((msg, false)) => (format!(" {msg} "), self.theme.status_info),
            None => (
                " q:quit  ?:help ".to_string(),
                Style::default().add_modifier(Modifier::DIM),
            ),
        };
        let width = hint.chars().count() as u16;
        let hint_x = area.right().saturating_sub(width).max(area.x);
        buf.set_stringn(hint_x, area.y, &hint, area.width as usize, style);
    }
}
