//! Detail pane: the selected charity, its favorite status, and what has
//! been donated to it so far.

use crate::theme::Theme;
use crate::widgets::results::format_distance;
use cdm_core::{
    store::{format_cents, RecordStore},
    Place,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

pub struct DetailPane<'a> {
    place: Option<&'a Place>,
    store: &'a RecordStore,
    theme: &'a Theme,
}

impl<'a> DetailPane<'a> {
    pub fn new(place: Option<&'a Place>, store: &'a RecordStore, theme: &'a Theme) -> Self {
        Self { place, store, theme }
    }
}

impl Widget for DetailPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Details").border_style(self.theme.border_unfocused);
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(place) = self.place else {
            Paragraph::new(Line::from(Span::styled("Nothing selected", self.theme.subtitle)))
                .render(inner, buf);
            return;
        };

        let label = |s: &'static str| Span::styled(s, Style::default().add_modifier(Modifier::DIM));
        let mut lines = vec![
            Line::from(Span::styled(place.name.clone(), self.theme.name)),
            Line::from(Span::styled(
                place.subtitle.clone().unwrap_or_else(|| "No address".to_string()),
                self.theme.subtitle,
            )),
            Line::default(),
        ];
        if place.distance_meters.is_some() {
            lines.push(Line::from(vec![
                label("Distance  "),
                Span::styled(format_distance(place.distance_meters), self.theme.distance),
            ]));
        }
        lines.push(Line::from(vec![label("Location  "), Span::raw(place.coordinate.to_string())]));

        let favorite = if self.store.is_favorite(&place.id) {
            Span::styled("★ favorite (f to remove)", self.theme.favorite)
        } else {
            Span::raw("f to add to favorites")
        };
        lines.push(Line::from(vec![label("Favorite  "), favorite]));

        let (count, cents) = self
            .store
            .donations("")
            .iter()
            .filter(|d| d.charity_name == place.name)
            .fold((0usize, 0u64), |(n, sum), d| (n + 1, sum + d.amount_cents));
        lines.push(Line::default());
        lines.push(Line::from(vec![
            label("Donated   "),
            Span::raw(format!("${} in {} donation(s)", format_cents(cents), count)),
        ]));
        lines.push(Line::from(Span::styled(
            ":donate <amount> to record a donation",
            Style::default().add_modifier(Modifier::DIM),
        )));

        Paragraph::new(lines).wrap(Wrap { trim: true }).render(inner, buf);
    }
}
