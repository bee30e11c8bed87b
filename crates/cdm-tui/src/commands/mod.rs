// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

use crate::{app::AppState, theme::Theme};
use cdm_core::{
    session::{MAX_RADIUS_KM, MIN_RADIUS_KM},
    store::format_cents,
    Category,
};

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Theme(String),
    Refresh,
    /// Set the search radius in kilometers.
    Radius(u32),
    Category(Category),
    /// Run a custom ("other") search for the given text.
    Search(String),
    /// Toggle the selected result in favorites.
    Favorite,
    /// Record a donation to the selected result.
    Donate { amount: String, method: Option<String> },
}

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// Returns `Ok(cmd)` on success, `Err(message)` on failure. An empty
    /// string returns `Err("")` as a sentinel meaning "close without acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "r" | "refresh" => Ok(Command::Refresh),
            "fav" | "favorite" => Ok(Command::Favorite),
            "theme" => {
                if rest.is_empty() {
                    Err("usage: theme <default|gruvbox>".to_string())
                } else {
                    Ok(Command::Theme(rest.to_string()))
                }
            }
            "radius" => match rest.trim_end_matches("km").trim().parse::<u32>() {
                Ok(n) if (MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&n) => Ok(Command::Radius(n)),
                Ok(_) => Err(format!("radius must be {MIN_RADIUS_KM}–{MAX_RADIUS_KM} km")),
                Err(_) => Err(format!("usage: radius <{MIN_RADIUS_KM}-{MAX_RADIUS_KM}>")),
            },
            "c" | "category" => rest.parse::<Category>().map(Command::Category),
            "s" | "search" => {
                if rest.is_empty() {
                    Err("usage: search <text>".to_string())
                } else {
                    Ok(Command::Search(rest.to_string()))
                }
            }
            "donate" => {
                let (amount, method) = rest
                    .split_once(char::is_whitespace)
                    .map(|(a, m)| (a, Some(m.trim().to_string())))
                    .unwrap_or((rest, None));
                if amount.is_empty() {
                    Err("usage: donate <amount> [method]".to_string())
                } else {
                    Ok(Command::Donate { amount: amount.to_string(), method })
                }
            }
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Execute a parsed [`Command`] against the application state.
pub fn execute_command(s: &mut AppState, cmd: Command) {
    match cmd {
        Command::Quit => s.quit = true,
        Command::Help => s.show_help = !s.show_help,
        Command::Theme(name) => match Theme::named(&name) {
            Some(theme) => s.theme = theme,
            None => s.set_error(format!("unknown theme: {name}")),
        },
        Command::Refresh => {
            s.session.refresh();
        }
        Command::Radius(km) => {
            s.session.set_radius_km(km);
        }
        Command::Category(category) => {
            s.session.set_category(category);
        }
        Command::Search(text) => {
            s.query.set(&text);
            s.session.search_custom(text);
        }
        Command::Favorite => s.toggle_favorite(),
        Command::Donate { amount, method } => {
            let Some(name) = s.selected().map(|p| p.name.clone()) else {
                s.set_error("select a charity first".to_string());
                return;
            };
            match s.store.record_donation(&name, &amount, method.as_deref()) {
                Ok(rec) => s.set_info(format!(
                    "recorded ${} to {}",
                    format_cents(rec.amount_cents),
                    rec.charity_name
                )),
                Err(e) => s.set_error(e.to_string()),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
