//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Each loop iteration first
//! applies finished search runs from the [`SearchSession`], then draws, then
//! handles at most one input event.

use crate::{
    commands::{execute_command, Command},
    event::{self, AppEvent, Direction},
    theme::Theme,
    widgets::{
        category_bar::CategoryBar,
        command_bar::{CommandBar, CommandBarState},
        detail::DetailPane,
        help::HelpPopup,
        query_bar::{QueryBar, QueryBarState},
        results::{ResultsList, ResultsState},
    },
};
use cdm_core::{
    session::{MAX_RADIUS_KM, MIN_RADIUS_KM},
    store::RecordStore,
    Category, Place, SearchSession,
};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    Frame, Terminal,
};
use std::{io, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Results,
    QueryBar,
    /// Vim-style `:` command line is active.
    Command,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub session: SearchSession,
    pub store: RecordStore,
    pub theme: Theme,
    pub focus: Focus,
    /// Focus state before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub query: QueryBarState,
    pub results: ResultsState,
    pub command_bar: CommandBarState,
    /// Last action feedback as `(message, is_error)`.
    pub status: Option<(String, bool)>,
    pub show_help: bool,
    pub quit: bool,
}

impl AppState {
    pub fn selected(&self) -> Option<&Place> {
        self.results.selected(self.session.results())
    }

    pub fn set_info(&mut self, msg: String) {
        self.status = Some((msg, false));
    }

    pub fn set_error(&mut self, msg: String) {
        tracing::debug!(error = %msg, "status error");
        self.status = Some((msg, true));
    }

    pub fn toggle_favorite(&mut self) {
        let Some(place) = self.selected().cloned() else {
            self.set_error("select a charity first".to_string());
            return;
        };
        match self.store.toggle_favorite(&place) {
            Ok(true) => self.set_info(format!("★ {} added to favorites", place.name)),
            Ok(false) => self.set_info(format!("{} removed from favorites", place.name)),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Apply finished search runs. Returns true when a new list was published.
    pub fn tick(&mut self) -> bool {
        let changed = self.session.poll_completed();
        if changed {
            self.results.to_top();
        }
        changed
    }

    fn step_radius(&mut self, up: bool) {
        let current = self.session.radius_km();
        let next = if up { current + 1 } else { current.saturating_sub(1) };
        let next = next.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM);
        if next != current {
            self.session.set_radius_km(next);
        }
    }

    fn empty_message(&self) -> String {
        if self.session.category() == Category::Other && self.session.free_text().trim().is_empty() {
            "Press / and type what you are looking for".to_string()
        } else {
            format!("No charities found within {} km", self.session.radius_km())
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
}

impl App {
    /// Build the app and start the initial search.
    pub fn new(mut session: SearchSession, store: RecordStore, theme: Theme) -> Self {
        session.refresh();
        let mut query = QueryBarState::default();
        query.set(session.free_text());
        let status = session
            .origin()
            .is_none()
            .then(|| ("no location configured; distances unavailable".to_string(), false));

        App {
            state: AppState {
                session,
                store,
                theme,
                focus: Focus::Results,
                prev_focus: Focus::Results,
                query,
                results: ResultsState::default(),
                command_bar: CommandBarState::default(),
                status,
                show_help: false,
                quit: false,
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.state.tick();
            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(33))? {
                match ct_event::read()? {
                    Event::Key(key) if key.kind == crossterm::event::KeyEventKind::Press => {
                        let raw = Event::Key(key);
                        let app_event = if is_insert_mode(self.state.focus) {
                            event::to_app_event_insert(raw)
                        } else {
                            event::to_app_event(raw)
                        };
                        if let Some(ev) = app_event {
                            tracing::debug!(focus = ?self.state.focus, event = ?ev, "key event");
                            self.handle(ev);
                        }
                    }
                    other => {
                        if let Some(ev) = event::to_app_event(other) {
                            self.handle(ev);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn handle(&mut self, event: AppEvent) {
        let s = &mut self.state;

        // Help popup intercepts all events; only close keys pass through.
        if s.show_help {
            if matches!(event, AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit) {
                s.show_help = false;
            }
            return;
        }

        match s.focus {
            Focus::Command => handle_command_bar(s, event),
            Focus::QueryBar => handle_query_bar(s, event),
            Focus::Results => handle_results(s, event),
        }
    }
}

/// Returns true when the current focus is on a text-input widget, meaning
/// alphabetic keys should produce characters rather than trigger shortcuts.
fn is_insert_mode(focus: Focus) -> bool {
    matches!(focus, Focus::QueryBar | Focus::Command)
}

fn handle_command_bar(s: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::Escape => {
            tracing::debug!("command bar cancelled");
            s.command_bar.clear();
            s.focus = s.prev_focus;
        }
        AppEvent::Quit => s.quit = true,
        AppEvent::Enter => match Command::parse(&s.command_bar.input) {
            Ok(cmd) => {
                tracing::debug!(command = ?cmd, "executing command");
                s.command_bar.clear();
                s.focus = s.prev_focus;
                execute_command(s, cmd);
            }
            Err(msg) if msg.is_empty() => {
                s.command_bar.clear();
                s.focus = s.prev_focus;
            }
            // Show the error; bar stays open
            Err(msg) => s.command_bar.error = Some(msg),
        },
        other => s.command_bar.handle(&other),
    }
}

fn handle_query_bar(s: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::Quit => s.quit = true,
        AppEvent::Escape | AppEvent::FocusNext => s.focus = Focus::Results,
        AppEvent::Enter => {
            let token = s.session.search_custom(s.query.query.clone());
            tracing::debug!(token, text = %s.query.query, "custom search submitted");
            s.focus = Focus::Results;
        }
        other => s.query.handle(&other),
    }
}

fn handle_results(s: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::Char('?') => s.show_help = true,
        AppEvent::Char(':') => {
            s.prev_focus = s.focus;
            s.command_bar.clear();
            s.focus = Focus::Command;
        }
        AppEvent::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            s.session.set_category(Category::ALL[index]);
        }
        AppEvent::Quit => s.quit = true,
        AppEvent::FocusNext | AppEvent::QueryFocus => s.focus = Focus::QueryBar,
        AppEvent::Nav(Direction::Left) => {
            let prev = s.session.category().prev();
            s.session.set_category(prev);
        }
        AppEvent::Nav(Direction::Right) => {
            let next = s.session.category().next();
            s.session.set_category(next);
        }
        AppEvent::RadiusUp => s.step_radius(true),
        AppEvent::RadiusDown => s.step_radius(false),
        AppEvent::ToggleFavorite => s.toggle_favorite(),
        AppEvent::Refresh => {
            s.session.refresh();
        }
        other @ (AppEvent::Nav(_) | AppEvent::ScrollUp | AppEvent::ScrollDown) => {
            let len = s.session.results().len();
            s.results.handle(&other, len);
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: 1-line category bar | body | 3-line query bar
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([Constraint::Length(1), Constraint::Fill(1), Constraint::Length(3)])
        .split(area);

    let horiz = Layout::default()
        .direction(LayoutDir::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Fill(1)])
        .split(vert[1]);

    let session = &state.session;
    let empty_message = state.empty_message();

    frame.render_widget(
        CategoryBar::new(session.category(), state.status.as_ref(), &state.theme),
        vert[0],
    );
    frame.render_widget(
        ResultsList::new(
            &state.results,
            session.results(),
            &state.store,
            session.is_loading(),
            &empty_message,
            state.focus == Focus::Results,
            &state.theme,
        ),
        horiz[0],
    );
    frame.render_widget(DetailPane::new(state.selected(), &state.store, &state.theme), horiz[1]);
    frame.render_widget(
        QueryBar::new(
            &state.query,
            state.focus == Focus::QueryBar,
            session.radius_km(),
            session.is_loading(),
            &state.theme,
        ),
        vert[2],
    );

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom().saturating_sub(1), height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
        return;
    }

    if state.focus == Focus::QueryBar {
        let qb = QueryBar::new(&state.query, true, session.radius_km(), false, &state.theme);
        frame.set_cursor_position(qb.cursor_position(vert[2]));
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
