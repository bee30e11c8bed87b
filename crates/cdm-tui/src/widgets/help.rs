//! Help popup: centred floating overlay listing all keybindings.
//!
//! Toggle with `?`; close with `?` or `Escape`.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

const BINDINGS: &[(&str, &str)] = &[
    ("q  /  Ctrl+c", "Quit"),
    ("Tab", "Cycle focus: results → query"),
    ("/", "Focus query bar (type, then Enter to search)"),
    ("Escape", "Return focus from query bar"),
    ("↑ k  /  ↓ j", "Move selection"),
    ("← h  /  → l", "Previous / next category"),
    ("1 – 5", "Jump to category"),
    ("PageUp  /  Ctrl+u", "Page results up"),
    ("PageDown / Ctrl+d", "Page results down"),
    ("]  /  [", "Widen / narrow radius by 1 km"),
    ("f", "Toggle favorite on selection"),
    ("r", "Refresh search"),
    (":", "Command line (:help for commands)"),
    ("?", "Toggle this help popup"),
];

const COMMANDS: &[(&str, &str)] = &[
    (":radius <1-50>", "Set radius in km"),
    (":category <name>", "Switch category"),
    (":search <text>", "Custom search"),
    (":donate <amount> [method]", "Record a donation to selection"),
    (":fav", "Toggle favorite"),
    (":theme <default|gruvbox>", "Switch theme"),
];

pub struct HelpPopup<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (BINDINGS.len() + COMMANDS.len() + 3) as u16;
        let popup = centered_rect(72, height, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" cdm keybindings (? to close) ")
            .border_style(self.theme.border_focused);

        let inner = block.inner(popup);
        block.render(popup, buf);

        let row = |(key, desc): &(&str, &str)| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<26}", key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(desc.to_string()),
            ])
        };

        let mut lines: Vec<Line> = BINDINGS.iter().map(row).collect();
        lines.push(Line::default());
        lines.extend(COMMANDS.iter().map(row));

        Paragraph::new(lines).render(inner, buf);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
