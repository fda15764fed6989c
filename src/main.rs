use anyhow::Context;
use clap::{Parser, Subcommand};
use runit_events::apis::{FinishersSource, StaticSource};
use runit_events::config::Config;
use runit_events::types::DocumentSource;
use runit_events::{logging, metrics};
use runit_events::{ButtonState, Catalog, Event, FilterState, MapViewport, Pipeline};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "runit")]
#[command(about = "Lists and maps road-race events from the finishers aggregator")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (default: ./config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read pages from a JSON fixture instead of the network
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the event listing
    List {
        /// Only events that can be booked directly
        #[arg(long)]
        reservable: bool,
        /// Only events in this city (exact match)
        #[arg(long)]
        region: Option<String>,
        /// Drop events listed more than once
        #[arg(long)]
        dedupe: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the cities available to the region filter
    Regions {
        #[arg(long)]
        json: bool,
    },
    /// Print map markers with their events
    Map {
        #[arg(long)]
        json: bool,
    },
    /// Report events served more than once across pages
    Duplicates,
}

#[derive(Serialize)]
struct ListingRow<'a> {
    #[serde(flatten)]
    event: &'a Event,
    button: ButtonState,
    label: &'static str,
    enabled: bool,
}

#[derive(Serialize)]
struct MapOutput<'a> {
    viewport: MapViewport,
    groups: &'a [runit_events::EventGroup],
}

fn build_source(cli: &Cli, config: &Config) -> anyhow::Result<Box<dyn DocumentSource>> {
    match &cli.fixture {
        Some(path) => {
            let source = StaticSource::from_file(path)
                .with_context(|| format!("loading fixture {}", path.display()))?;
            Ok(Box::new(source))
        }
        None => Ok(Box::new(FinishersSource::from_config(config)?)),
    }
}

fn print_listing(catalog: &Catalog, state: &FilterState, json: bool) -> anyhow::Result<()> {
    let view = catalog.view(state);
    if json {
        let rows: Vec<ListingRow> = view
            .iter()
            .map(|&event| {
                let button = event.button_state();
                ListingRow {
                    event,
                    button,
                    label: button.label(),
                    enabled: button.is_enabled(),
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut scope = Vec::new();
    if state.reservable_only {
        scope.push("réservables".to_string());
    }
    if let Some(region) = &state.region {
        scope.push(format!("région: {}", region));
    }
    if scope.is_empty() {
        println!("📋 {} événements", view.len());
    } else {
        println!("📋 {} événements ({})", view.len(), scope.join(", "));
    }

    for event in view {
        let button = event.button_state();
        println!(
            "   {:<12} {} | {} [{}] {}",
            event.display_date(),
            event.name,
            event.venue.city,
            button.label(),
            event.registration_url()
        );
        if button.is_enabled() {
            if let Err(e) = event.registration.checked_url() {
                println!("      ⚠️  {}", e);
            }
        }
    }
    Ok(())
}

fn print_map(catalog: &Catalog, json: bool) -> anyhow::Result<()> {
    let groups = catalog.groups();
    let viewport = MapViewport::default();
    for group in groups.iter().filter(|g| !g.is_sentinel()) {
        if !viewport.contains(&group.coordinates) {
            warn!(
                "Marker {} ({}, {}) is outside the initial map region",
                group.title(),
                group.coordinates.latitude,
                group.coordinates.longitude
            );
        }
    }
    if json {
        let output = MapOutput {
            viewport,
            groups: &groups,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("🗺️  {} marqueurs", groups.len());
    for group in &groups {
        println!(
            "📍 {} ({}, {}) | {} événement(s)",
            group.title(),
            group.coordinates.latitude,
            group.coordinates.longitude,
            group.events.len()
        );
        if group.is_sentinel() {
            println!("   ⚠️  coordonnées manquantes, marqueur regroupé en (0, 0)");
        }
        for event in &group.events {
            println!(
                "   - {} | {} | {}",
                event.name,
                event.display_date(),
                event.venue.city
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging);
    if let Some(addr) = &config.metrics_addr {
        metrics::init_metrics(addr);
    }

    let source = build_source(&cli, &config)?;
    let policy = config.url_policy();
    info!("Using source {}", source.source_name());

    let catalog = match Pipeline::run(source.as_ref(), &policy).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            eprintln!("❌ Impossible de charger les événements: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Commands::List {
            reservable,
            region,
            dedupe,
            json,
        } => {
            let catalog = if dedupe { catalog.deduplicated() } else { catalog };
            let state = FilterState::new(reservable, region);
            if let Some(region) = &state.region {
                if !catalog.regions.contains(region) {
                    warn!("Unknown region filter: {}", region);
                }
            }
            print_listing(&catalog, &state, json)?;
        }
        Commands::Regions { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog.regions)?);
            } else {
                for region in &catalog.regions {
                    println!("{}", region);
                }
            }
        }
        Commands::Map { json } => print_map(&catalog, json)?,
        Commands::Duplicates => {
            let duplicates = catalog.duplicates();
            if duplicates.is_empty() {
                println!("✅ Aucun doublon");
            }
            for dup in duplicates {
                println!(
                    "🔁 {} | {} | {} (positions {:?})",
                    dup.name, dup.start_date, dup.city, dup.positions
                );
            }
        }
    }
    Ok(())
}
