//! cdm TUI: the ratatui "Discover" screen.
//!
//! The screen is a thin shell around a [`cdm_core::SearchSession`]: input
//! events change the session's category, free text or radius, and the event
//! loop applies finished search runs on every tick.

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;

use cdm_core::{config::Config, store::RecordStore, PlacesLookup, SearchAggregator, SearchSession};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Start the TUI. Search runs are spawned on `runtime`; this call blocks the
/// current thread until the user quits, so it must not be made from inside
/// an async task.
pub fn run(
    config: &Config,
    runtime: Handle,
    client: Arc<dyn PlacesLookup>,
    store: RecordStore,
) -> anyhow::Result<()> {
    let theme = theme::Theme::named(&config.ui.theme).unwrap_or_else(|| {
        tracing::warn!(theme = %config.ui.theme, "unknown theme, using default");
        theme::Theme::load_default()
    });

    let session = SearchSession::new(SearchAggregator::new(client), runtime)
        .with_origin(config.location.origin())
        .with_radius_km(config.search.default_radius_km)
        .with_max_results(config.search.max_results);

    App::new(session, store, theme).run()
}
