use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

use tidal_route::config::{Config, ConfigError};
use tidal_route::current::{CurrentTable, CurrentTableError, NoCurrent};
use tidal_route::export::{gpx, table, ExportError};
use tidal_route::planner::{PlanError, PlanRequest, Planner, RouteCollection};
use tidal_route::route::{RouteFileError, RoutePlan, RouteRecord};
use tidal_route::storage::{RouteStore, StorageError};

#[derive(Parser)]
#[command(name = "tidal-route")]
#[command(about = "Dead reckoning and tidal ETA route projection")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<String>,
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a waypoint file
    Validate { waypoints: String },
    /// Project a dead-reckoning route with no current
    Dr {
        waypoints: String,
        /// Base route name; defaults to the name in the waypoint file
        #[arg(long)]
        name: Option<String>,
        /// Departure time (RFC 3339); defaults to now
        #[arg(long)]
        start: Option<String>,
        /// Speed through the water in knots
        #[arg(long)]
        speed: Option<String>,
        /// Also write the route as GPX
        #[arg(long)]
        gpx: Option<PathBuf>,
    },
    /// Project ETA routes through a current table, one per departure
    Eta {
        waypoints: String,
        #[arg(long)]
        name: Option<String>,
        /// Current table (YAML)
        #[arg(long)]
        currents: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        speed: Option<String>,
        /// Number of departures, one hour apart
        #[arg(long, default_value_t = 1)]
        departures: usize,
        /// Write one GPX file per route into this folder
        #[arg(long)]
        gpx_dir: Option<PathBuf>,
    },
    /// List saved routes
    List,
    /// Show the fixes of a saved route
    Show { route: String },
    /// Export a saved route as GPX
    Export { route: String, output: PathBuf },
    /// Delete one saved route
    Delete { route: String },
    /// Delete all saved routes
    Clear,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("waypoint file: {0}")]
    Route(#[from] RouteFileError),
    #[error("current table: {0}")]
    Currents(#[from] CurrentTableError),
    #[error("{0}")]
    Plan(#[from] PlanError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("export: {0}")]
    Export(#[from] ExportError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid start time {0:?}: {1}")]
    Start(String, chrono::ParseError),
}

struct PlanArgs {
    waypoints: String,
    name: Option<String>,
    start: Option<String>,
    speed: Option<String>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let store = RouteStore::new(config.storage.base_folder.clone());

    match cli.command {
        Commands::Validate { waypoints } => validate(&waypoints),
        Commands::Dr {
            waypoints,
            name,
            start,
            speed,
            gpx,
        } => {
            let args = PlanArgs {
                waypoints,
                name,
                start,
                speed,
            };
            dr(&config, &store, args, gpx.as_deref(), cli.json)
        }
        Commands::Eta {
            waypoints,
            name,
            currents,
            start,
            speed,
            departures,
            gpx_dir,
        } => {
            let args = PlanArgs {
                waypoints,
                name,
                start,
                speed,
            };
            eta(&config, &store, args, &currents, departures, gpx_dir.as_deref(), cli.json)
        }
        Commands::List => list(&store, cli.json),
        Commands::Show { route } => show(&store, &route, cli.json),
        Commands::Export { route, output } => {
            let record = store.load(&route)?;
            gpx::save(&record, &output)?;
            println!("Exported {} to {}", route, output.display());
            Ok(())
        }
        Commands::Delete { route } => {
            store.delete(&route)?;
            println!("Deleted {}", route);
            Ok(())
        }
        Commands::Clear => {
            let removed = store.clear()?;
            println!("Removed {} routes", removed);
            Ok(())
        }
    }
}

fn validate(path: &str) -> Result<(), CliError> {
    let plan = RoutePlan::from_file(path)?;
    println!(
        "Waypoint file is valid ({} waypoints){}",
        plan.waypoints.len(),
        plan.name.map(|n| format!(", route {}", n)).unwrap_or_default()
    );
    for (i, waypoint) in plan.waypoints.iter().enumerate() {
        println!(
            "  {}: {} {:.4} {:.4}",
            i + 1,
            waypoint.name,
            waypoint.position.lat,
            waypoint.position.lon
        );
    }
    Ok(())
}

fn request(config: &Config, args: PlanArgs) -> Result<PlanRequest, CliError> {
    let plan = RoutePlan::from_file(&args.waypoints)?;

    let start_time = match args.start {
        Some(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| CliError::Start(s, e))?,
        None => Utc::now(),
    };

    let speed = args.speed.and_then(|s| match s.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Unreadable speed {:?}", s);
            None
        }
    });

    Ok(PlanRequest {
        base_name: args.name.or(plan.name).unwrap_or_default(),
        waypoints: plan.waypoints,
        start_time,
        speed: config.speed_or_default(speed),
    })
}

fn dr(
    config: &Config,
    store: &RouteStore,
    args: PlanArgs,
    gpx_path: Option<&Path>,
    json: bool,
) -> Result<(), CliError> {
    let request = request(config, args)?;
    let planner = Planner::new(config.planner.geometry.build(), Box::new(NoCurrent)).with_interval(config.interval()?);

    let mut collection = store.collection()?;
    let name = planner.plan_dr(&mut collection, &request)?;
    let committed = commit(store, &collection, &[name])?;

    for record in &committed {
        if let Some(path) = gpx_path {
            gpx::save(record, path)?;
        }
    }
    print_routes(&committed, json)
}

fn eta(
    config: &Config,
    store: &RouteStore,
    args: PlanArgs,
    currents: &str,
    departures: usize,
    gpx_dir: Option<&Path>,
    json: bool,
) -> Result<(), CliError> {
    let request = request(config, args)?;
    let table = CurrentTable::from_file(currents)?;
    let planner = Planner::new(config.planner.geometry.build(), Box::new(table)).with_interval(config.interval()?);

    let mut collection = store.collection()?;
    let before = collection.len();
    let result = planner.plan_eta(&mut collection, &request, departures);

    // departures committed before a failure are kept
    let names: Vec<String> = collection.iter().skip(before).map(|r| r.name().to_string()).collect();
    let committed = commit(store, &collection, &names)?;

    if let Some(dir) = gpx_dir {
        std::fs::create_dir_all(dir).map_err(ExportError::from)?;
        for record in &committed {
            gpx::save(record, dir.join(format!("{}.gpx", record.name())))?;
        }
    }
    print_routes(&committed, json)?;
    result?;
    Ok(())
}

fn commit(store: &RouteStore, collection: &RouteCollection, names: &[String]) -> Result<Vec<RouteRecord>, CliError> {
    let mut records = Vec::with_capacity(names.len());
    for name in names {
        if let Some(record) = collection.get(name) {
            store.save(record)?;
            records.push(record.clone());
        }
    }
    Ok(records)
}

fn print_routes(records: &[RouteRecord], json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        for record in records {
            println!("{}", table::fix_table(record));
        }
    }
    Ok(())
}

fn list(store: &RouteStore, json: bool) -> Result<(), CliError> {
    let summaries = store.list()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("No routes in {}", store.base().display());
    } else {
        println!("{}", table::summary_table(&summaries));
    }
    Ok(())
}

fn show(store: &RouteStore, name: &str, json: bool) -> Result<(), CliError> {
    let record = store.load(name)?;
    print_routes(std::slice::from_ref(&record), json)
}
