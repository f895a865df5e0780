#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Demo console for the safety map core.
//!
//! Drives a [`MapSession`] against a seeded in-memory store so the
//! proximity search, reconciliation, and focus behavior can be exercised
//! without a map UI. The console plays the presentation layer: it keeps a
//! [`DisplayState`] of fake entity handles and applies each emitted
//! [`ViewUpdate`] the way a map renderer would.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use safety_map_geo::GeoPoint;
use safety_map_report_models::{NewReport, SafetyLevel, VoteKind};
use safety_map_session::MapSession;
use safety_map_store::ReportStore;
use safety_map_store::memory::MemoryReportStore;
use safety_map_view::{DisplayState, ReportDelta, ViewUpdate};

/// User id the console submits and deletes reports as.
const CONSOLE_USER: &str = "console-user";

/// Downtown Manhattan, where the seed reports cluster.
const DEMO_CENTER: (f64, f64) = (40.7128, -74.006);

#[derive(Parser)]
#[command(name = "safety_map_cli", about = "Safety map demo console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted walkthrough of the core behaviors
    Demo,
    /// Drive a map session interactively
    Interactive,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let store = Arc::new(seed_store().await?);
    match cli.command {
        Commands::Demo => demo(store).await?,
        Commands::Interactive => interactive(store).await?,
    }

    Ok(())
}

/// Seeds the in-memory store with a handful of reports around the demo
/// center.
async fn seed_store() -> Result<MemoryReportStore, Box<dyn std::error::Error>> {
    let store = MemoryReportStore::new();
    let (lat, lon) = DEMO_CENTER;

    let seeds = [
        (0.0, 0.0, SafetyLevel::Safe, "busy and well lit"),
        (0.0008, -0.0006, SafetyLevel::BeCautious, "dim side street"),
        (-0.0005, 0.0009, SafetyLevel::Unsafe, "aggressive panhandling"),
        (0.0012, 0.0004, SafetyLevel::Dangerous, "mugging reported last week"),
    ];

    for (dlat, dlon, level, comment) in seeds {
        let location = GeoPoint::new(lat + dlat, lon + dlon)?;
        safety_map_reports::mutations::submit_report(
            &store,
            NewReport::new(location, "Lower Manhattan", level, comment, "seed-author"),
        )
        .await?;
    }

    log::info!("seeded {} reports around {lat}, {lon}", store.len());
    Ok(store)
}

/// The console's stand-in for a map renderer: entity handles are just
/// counters, and every applied update is printed.
struct Console {
    display: DisplayState<u64>,
    next_handle: u64,
}

impl Console {
    const fn new() -> Self {
        Self {
            display: DisplayState::new(),
            next_handle: 0,
        }
    }

    fn apply(&mut self, update: &ViewUpdate) {
        let delta = ReportDelta {
            added: update.added_entities.clone(),
            removed: update.removed_entity_ids.clone(),
        };
        let destroyed = self.display.apply_delta(&delta, |report| {
            self.next_handle += 1;
            println!(
                "  + entity #{} {} [{}] \"{}\" ({})",
                self.next_handle,
                report.id,
                report.level.display_name(),
                report.comment,
                report.age_label(chrono::Utc::now()),
            );
            self.next_handle
        });
        for handle in destroyed {
            println!("  - entity #{handle} destroyed");
        }

        let hidden: Vec<&str> = update
            .visibility
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(id, _)| id.as_str())
            .collect();
        if !hidden.is_empty() {
            println!("  ~ {} radius circles hidden", hidden.len());
        }
        if let Some(location) = update.recenter_to {
            println!(
                "  > recenter to ({:.4}, {:.4}) at zoom {}",
                location.latitude(),
                location.longitude(),
                safety_map_view::FOCUS_ZOOM,
            );
        }
        println!("  = {} entities on screen", self.display.len());
    }

    fn displayed_ids(&self) -> Vec<String> {
        self.display.ids().map(ToString::to_string).collect()
    }
}

async fn demo(store: Arc<MemoryReportStore>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = MapSession::new(Arc::<MemoryReportStore>::clone(&store));
    let mut console = Console::new();
    let center = GeoPoint::new(DEMO_CENTER.0, DEMO_CENTER.1)?;

    println!("Loading reports within 10 km...");
    let update = session.load_nearby(center, Some(10.0)).await?;
    console.apply(&update);

    println!("\nSubmitting a new report...");
    let update = session
        .submit(NewReport::new(
            center,
            "Lower Manhattan",
            SafetyLevel::Safe,
            "patrol car stationed on the corner",
            CONSOLE_USER,
        ))
        .await?;
    console.apply(&update);

    let focus_id = console
        .displayed_ids()
        .first()
        .cloned()
        .ok_or("no reports displayed after the nearby load")?;

    println!("\nFocusing report {focus_id}...");
    let update = session.toggle_focus(&focus_id);
    console.apply(&update);

    println!("\nUpvoting {focus_id} (displayed copy stays stale)...");
    session.vote(&focus_id, VoteKind::Upvote).await?;
    let stored_votes = store
        .get(&focus_id)
        .await?
        .map_or(0, |report| report.upvotes);
    let displayed_votes = session
        .displayed_report(&focus_id)
        .map_or(0, |report| report.upvotes);
    println!("  store: {stored_votes} upvotes, displayed entity: {displayed_votes}");

    println!("\nClearing focus...");
    let update = session.clear_focus();
    console.apply(&update);

    println!("\nDeleting the console user's own report...");
    let own_id = session
        .displayed_ids()
        .find_map(|id| {
            session
                .displayed_report(id)
                .filter(|report| report.author_id == CONSOLE_USER)
                .map(|report| report.id.clone())
        })
        .ok_or("the console's own report is not displayed")?;
    let update = session.delete(&own_id, CONSOLE_USER).await?;
    console.apply(&update);

    Ok(())
}

enum Action {
    LoadNearby,
    LoadRecent,
    Submit,
    Vote,
    ToggleFocus,
    Delete,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::LoadNearby,
        Self::LoadRecent,
        Self::Submit,
        Self::Vote,
        Self::ToggleFocus,
        Self::Delete,
        Self::Quit,
    ];

    const fn label(&self) -> &'static str {
        match self {
            Self::LoadNearby => "Load nearby reports",
            Self::LoadRecent => "Load recent reports",
            Self::Submit => "Submit a report",
            Self::Vote => "Vote on a report",
            Self::ToggleFocus => "Toggle focus",
            Self::Delete => "Delete a report",
            Self::Quit => "Quit",
        }
    }
}

async fn interactive(store: Arc<MemoryReportStore>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = MapSession::new(store);
    let mut console = Console::new();

    println!("Safety Map Console (reports are in-memory only)");
    println!();

    loop {
        let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let result = match Action::ALL[idx] {
            Action::LoadNearby => {
                let center = prompt_point()?;
                let radius: f64 = Input::new()
                    .with_prompt("Radius km")
                    .default(safety_map_reports::queries::DEFAULT_RADIUS_KM)
                    .interact_text()?;
                session.load_nearby(center, Some(radius)).await
            }
            Action::LoadRecent => session.load_recent(None).await,
            Action::Submit => {
                let location = prompt_point()?;
                let level = prompt_level()?;
                let comment: String = Input::new().with_prompt("Comment").interact_text()?;
                session
                    .submit(NewReport::new(
                        location,
                        "Unnamed Area",
                        level,
                        comment,
                        CONSOLE_USER,
                    ))
                    .await
            }
            Action::Vote => {
                let id = prompt_id(&console)?;
                let is_upvote = Select::new()
                    .with_prompt("Vote")
                    .items(&["Upvote", "Downvote"])
                    .default(0)
                    .interact()?
                    == 0;
                let kind = if is_upvote {
                    VoteKind::Upvote
                } else {
                    VoteKind::Downvote
                };
                match session.vote(&id, kind).await {
                    Ok(()) => {
                        println!("  vote recorded");
                        continue;
                    }
                    Err(e) => Err(e),
                }
            }
            Action::ToggleFocus => {
                let id = prompt_id(&console)?;
                Ok(session.toggle_focus(&id))
            }
            Action::Delete => {
                let id = prompt_id(&console)?;
                session.delete(&id, CONSOLE_USER).await
            }
            Action::Quit => break,
        };

        // Failures surface as one displayable message; the session state
        // stays consistent with the last successful fetch.
        match result {
            Ok(update) => console.apply(&update),
            Err(e) => println!("  ! {e}"),
        }
        println!();
    }

    Ok(())
}

fn prompt_point() -> Result<GeoPoint, Box<dyn std::error::Error>> {
    let latitude: f64 = Input::new()
        .with_prompt("Latitude")
        .default(DEMO_CENTER.0)
        .interact_text()?;
    let longitude: f64 = Input::new()
        .with_prompt("Longitude")
        .default(DEMO_CENTER.1)
        .interact_text()?;
    Ok(GeoPoint::new(latitude, longitude)?)
}

fn prompt_level() -> Result<SafetyLevel, Box<dyn std::error::Error>> {
    let levels = SafetyLevel::all();
    let labels: Vec<&str> = levels.iter().map(|l| l.display_name()).collect();
    let idx = Select::new()
        .with_prompt("Safety level")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(levels[idx])
}

fn prompt_id(console: &Console) -> Result<String, Box<dyn std::error::Error>> {
    let ids = console.displayed_ids();
    if ids.is_empty() {
        let id: String = Input::new().with_prompt("Report id").interact_text()?;
        return Ok(id);
    }
    let idx = Select::new()
        .with_prompt("Report")
        .items(&ids)
        .default(0)
        .interact()?;
    Ok(ids[idx].clone())
}
