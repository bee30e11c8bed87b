//! Results list: the scrollable list of nearby charities.
//!
//! # Navigation (when pane is focused)
//!
//! | Key | Action |
//! |-----|--------|
//! | `↑` / `k` | Select previous result |
//! | `↓` / `j` | Select next result |
//! | `PageUp` / `Ctrl+u` | Up one page |
//! | `PageDown` / `Ctrl+d` | Down one page |
//!
//! `cursor` is an index into the published result list; `offset` is the
//! first visible row. The cursor is always kept inside the visible window.

use std::cell::Cell;

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use cdm_core::{store::RecordStore, Place};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

const PAGE_STEP: usize = 10;
/// Each result takes a name row and a subtitle row.
const ROWS_PER_ITEM: usize = 2;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

pub struct ResultsState {
    pub cursor: usize,
    pub offset: usize,
    /// Visible item count cached from the last render.
    last_height: Cell<usize>,
}

impl Default for ResultsState {
    fn default() -> Self {
        Self { cursor: 0, offset: 0, last_height: Cell::new(10) }
    }
}

impl ResultsState {
    fn height(&self) -> usize {
        self.last_height.get().max(1)
    }

    /// Select the first row. Called whenever a new list is published.
    pub fn to_top(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    /// The selected place, if any.
    pub fn selected<'p>(&self, places: &'p [Place]) -> Option<&'p Place> {
        places.get(self.cursor)
    }

    pub fn handle(&mut self, event: &AppEvent, len: usize) {
        if len == 0 {
            return;
        }
        match event {
            AppEvent::Nav(Direction::Up) => self.cursor = self.cursor.saturating_sub(1),
            AppEvent::Nav(Direction::Down) => self.cursor = (self.cursor + 1).min(len - 1),
            AppEvent::ScrollUp => self.cursor = self.cursor.saturating_sub(PAGE_STEP),
            AppEvent::ScrollDown => self.cursor = (self.cursor + PAGE_STEP).min(len - 1),
            _ => return,
        }
        self.follow_cursor();
        tracing::debug!(cursor = self.cursor, offset = self.offset, "results: cursor moved");
    }

    fn follow_cursor(&mut self) {
        let height = self.height();
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct ResultsList<'a> {
    state: &'a ResultsState,
    places: &'a [Place],
    store: &'a RecordStore,
    loading: bool,
    /// Shown when the list is empty and no search is running.
    empty_message: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> ResultsList<'a> {
    pub fn new(
        state: &'a ResultsState,
        places: &'a [Place],
        store: &'a RecordStore,
        loading: bool,
        empty_message: &'a str,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self { state, places, store, loading, empty_message, focused, theme }
    }
}

impl Widget for ResultsList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!("Nearby ({})", self.places.len());
        let block = Block::bordered().title(title).border_style(self.theme.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let visible = (inner.height as usize / ROWS_PER_ITEM).max(1);
        self.state.last_height.set(visible);

        if self.places.is_empty() {
            let (msg, style) = if self.loading {
                ("Searching nearby…", self.theme.loading)
            } else {
                (self.empty_message, self.theme.subtitle)
            };
            Paragraph::new(Line::from(Span::styled(msg.to_string(), style))).render(inner, buf);
            return;
        }

        let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
        let sb_area = Rect { x: inner.right().saturating_sub(1), width: 1, ..inner };

        let start = self.state.offset.min(self.places.len().saturating_sub(1));
        let end = (start + visible).min(self.places.len());
        let lines: Vec<Line<'static>> = self.places[start..end]
            .iter()
            .enumerate()
            .flat_map(|(row, place)| {
                let selected = self.focused && start + row == self.state.cursor;
                render_place(place, self.store.is_favorite(&place.id), selected, self.theme)
            })
            .collect();
        Paragraph::new(lines).render(text_area, buf);

        let mut sb_state = ScrollbarState::new(self.places.len())
            .position(start)
            .viewport_content_length(visible);
        StatefulWidget::render(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            sb_area,
            buf,
            &mut sb_state,
        );
    }
}

// ---------------------------------------------------------------------------
// Row rendering
// ---------------------------------------------------------------------------

fn render_place(place: &Place, favorite: bool, selected: bool, theme: &Theme) -> [Line<'static>; 2] {
    let marker = if favorite {
        Span::styled("★ ", theme.favorite)
    } else {
        Span::raw("  ")
    };
    let mut name = Line::from(vec![
        marker,
        Span::styled(place.name.clone(), theme.name),
        Span::raw("  "),
        Span::styled(format_distance(place.distance_meters), theme.distance),
    ]);
    let mut subtitle = Line::from(Span::styled(
        format!("  {}", place.subtitle.as_deref().unwrap_or("")),
        theme.subtitle,
    ));
    if selected {
        name = name.patch_style(theme.selected);
        subtitle = subtitle.patch_style(theme.selected);
    }
    [name, subtitle]
}

/// `"850 m"`, `"2.4 km"`, or empty when there is no origin.
pub fn format_distance(meters: Option<f64>) -> String {
    match meters {
        None => String::new(),
        Some(m) if m < 1_000.0 => format!("{:.0} m", m),
        Some(m) => format!("{:.1} km", m / 1_000.0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_is_bounded() {
        let mut s = ResultsState::default();
        s.handle(&AppEvent::Nav(Direction::Up), 3);
        assert_eq!(s.cursor, 0);
        s.handle(&AppEvent::ScrollDown, 3);
        assert_eq!(s.cursor, 2);
        s.handle(&AppEvent::Nav(Direction::Down), 3);
        assert_eq!(s.cursor, 2);
    }

    #[test]
    fn window_follows_cursor() {
        let mut s = ResultsState::default();
        s.last_height.set(4);
        for _ in 0..6 {
            s.handle(&AppEvent::Nav(Direction::Down), 20);
        }
        assert_eq!(s.cursor, 6);
        assert_eq!(s.offset, 3);
        s.handle(&AppEvent::ScrollUp, 20);
        assert_eq!(s.cursor, 0);
        assert_eq!(s.offset, 0);
    }

    #[test]
    fn to_top_resets_window() {
        let mut s = ResultsState { cursor: 9, offset: 5, ..ResultsState::default() };
        s.to_top();
        assert_eq!((s.cursor, s.offset), (0, 0));
    }

    #[test]
    fn distance_formatting() {
        assert_eq!(format_distance(None), "");
        assert_eq!(format_distance(Some(849.6)), "850 m");
        assert_eq!(format_distance(Some(2_449.0)), "2.4 km");
    }
}
