//! Command-line interface: argument types and subcommand dispatch.

use anyhow::Context;
use cdm_core::{
    config::Config,
    store::{format_cents, RecordStore},
    Category, Coordinate, Place, SearchAggregator, SearchSession,
};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Debug, Parser)]
#[command(name = "cdm", about = "Charity Donation Manager: find nearby charities, keep favorites, record donations")]
pub struct Cli {
    /// Write debug logs to $TMPDIR/cdm-debug.log (tail -f to inspect).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Keep favorites and donations in memory only; nothing is written.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Open the interactive discover screen (default).
    Tui,
    /// Search for nearby charities and print the results.
    Search(SearchArgs),
    /// List or remove favorite charities.
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Record a donation.
    Donate {
        charity: String,
        /// Amount such as 25 or 12.50.
        amount: String,
        #[arg(long)]
        method: Option<String>,
    },
    /// List recorded donations, newest first.
    Donations {
        /// Keep donations whose charity, payment method or amount contains this.
        #[arg(long, short, default_value = "")]
        filter: String,
    },
    /// Show or update the local profile.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// all, food, health, education or other.
    #[arg(long, short, default_value = "all")]
    pub category: Category,
    /// Free text; implies the "other" category.
    #[arg(long, short)]
    pub text: Option<String>,
    #[arg(long, short)]
    pub radius_km: Option<u32>,
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,
    #[arg(long)]
    pub max: Option<usize>,
    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorites, newest first.
    List {
        #[arg(long, short, default_value = "")]
        filter: String,
    },
    /// Remove a favorite by place id.
    Remove { place_id: String },
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,
    Set {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Delete the profile, all favorites and all donation records.
    Delete {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli, config: Config) -> anyhow::Result<()> {
    let mut store = open_store(&config, cli.ephemeral)?;

    match cli.command.unwrap_or(CliCommand::Tui) {
        CliCommand::Tui => {
            let runtime = runtime()?;
            let client = cdm_places::from_config(&config.places)?;
            cdm_tui::run(&config, runtime.handle().clone(), client, store)
        }
        CliCommand::Search(args) => {
            let runtime = runtime()?;
            let client = cdm_places::from_config(&config.places)?;
            let places = search(&runtime, &config, client, &args);
            print_places(&places, &store, args.json)
        }
        other => run_record_command(other, &mut store),
    }
}

/// Handle the subcommands that only read or write the local record store.
fn run_record_command(command: CliCommand, store: &mut RecordStore) -> anyhow::Result<()> {
    match command {
        CliCommand::Favorites(FavoritesCommand::List { filter }) => {
            for f in store.favorites(&filter) {
                println!(
                    "{}  {}  {}  ({})",
                    f.created_at.format("%Y-%m-%d"),
                    f.name,
                    f.subtitle.as_deref().unwrap_or("-"),
                    f.place_id
                );
            }
        }
        CliCommand::Favorites(FavoritesCommand::Remove { place_id }) => {
            if store.remove_favorite(&place_id)? {
                println!("removed {place_id}");
            } else {
                println!("{place_id} is not a favorite");
            }
        }
        CliCommand::Donate { charity, amount, method } => {
            let rec = store.record_donation(&charity, &amount, method.as_deref())?;
            println!(
                "recorded #{}: ${} to {} ({})",
                rec.id,
                format_cents(rec.amount_cents),
                rec.charity_name,
                rec.payment_method
            );
        }
        CliCommand::Donations { filter } => {
            let donations = store.donations(&filter);
            for d in &donations {
                println!(
                    "#{:<4} {}  ${:>10}  {}  ({})",
                    d.id,
                    d.date.format("%Y-%m-%d %H:%M"),
                    format_cents(d.amount_cents),
                    d.charity_name,
                    d.payment_method
                );
            }
            let total: u64 = donations.iter().map(|d| d.amount_cents).sum();
            println!("total: ${}", format_cents(total));
        }
        CliCommand::Profile(ProfileCommand::Show) => {
            let p = store.profile();
            println!("name:  {}", p.name);
            println!("email: {}", p.email);
        }
        CliCommand::Profile(ProfileCommand::Set { name, email }) => {
            store.update_profile(&name, &email)?;
            println!("profile updated");
        }
        CliCommand::Profile(ProfileCommand::Delete { yes }) => {
            anyhow::ensure!(yes, "this deletes every favorite and donation record; pass --yes to confirm");
            store.clear()?;
            println!("profile and records deleted");
        }
        other @ (CliCommand::Tui | CliCommand::Search(_)) => {
            anyhow::bail!("{other:?} needs a places provider, not just the record store")
        }
    }
    Ok(())
}

fn runtime() -> anyhow::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("could not start the async runtime")
}

fn open_store(config: &Config, ephemeral: bool) -> anyhow::Result<RecordStore> {
    if ephemeral {
        return Ok(RecordStore::in_memory());
    }
    let path = config.store.resolved_path();
    RecordStore::open(&path).with_context(|| format!("could not open record store {}", path.display()))
}

fn search(
    runtime: &Runtime,
    config: &Config,
    client: Arc<dyn cdm_core::PlacesLookup>,
    args: &SearchArgs,
) -> Vec<Place> {
    let origin = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
        _ => config.location.origin(),
    };
    let mut session = SearchSession::new(SearchAggregator::new(client), runtime.handle().clone())
        .with_origin(origin)
        .with_radius_km(args.radius_km.unwrap_or(config.search.default_radius_km))
        .with_max_results(args.max.unwrap_or(config.search.max_results));

    match &args.text {
        Some(text) => session.search_custom(text.clone()),
        None => session.set_category(args.category),
    };
    runtime.block_on(session.wait_idle());
    session.results().to_vec()
}

fn print_places(places: &[Place], store: &RecordStore, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(places)?);
        return Ok(());
    }
    if places.is_empty() {
        println!("no charities found");
    }
    for p in places {
        let distance = p
            .distance_meters
            .map(|m| format!("{:>8.2} km", m / 1_000.0))
            .unwrap_or_else(|| format!("{:>11}", "-"));
        let star = if store.is_favorite(&p.id) { "★" } else { " " };
        println!("{distance}  {star} {}  {}", p.name, p.subtitle.as_deref().unwrap_or(""));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
