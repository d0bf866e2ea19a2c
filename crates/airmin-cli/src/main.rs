mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use airmin_cli::logging::{init_logging, LoggingConfig};
use airmin_cli::output::OutputFormat;
use airmin_lib::{resolve_database_path, CityId};

use commands::cheapest::{handle_cheapest, CheapestCommandArgs};
use commands::cities::handle_cities;
use commands::import::{handle_import_airports, handle_import_routes};
use commands::init::handle_init;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find the cheapest flight itinerary between two cities")]
struct Cli {
    /// Database file (or directory holding airmin.db). Falls back to
    /// AIRMIN_DATABASE, then the platform data directory.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and its tables.
    Init,
    /// Import cities and airports from an OpenFlights airports file.
    ImportAirports {
        /// Headerless airports CSV.
        #[arg(long)]
        file: PathBuf,
    },
    /// Import priced routes from an OpenFlights-style routes file.
    ImportRoutes {
        /// Headerless routes CSV with a trailing price column.
        #[arg(long)]
        file: PathBuf,
    },
    /// List stored cities and their ids.
    Cities,
    /// Find the cheapest itinerary between two cities.
    Cheapest {
        /// Departure city id.
        #[arg(long = "from")]
        from: Option<CityId>,
        /// Arrival city id.
        #[arg(long = "to")]
        to: Option<CityId>,
    },
}

fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());
    let cli = Cli::parse();

    let database = resolve_database_path(cli.database.as_deref())
        .context("failed to resolve the database location")?;

    match cli.command {
        Command::Init => handle_init(&database),
        Command::ImportAirports { file } => handle_import_airports(&database, &file, cli.format),
        Command::ImportRoutes { file } => handle_import_routes(&database, &file, cli.format),
        Command::Cities => handle_cities(&database, cli.format),
        Command::Cheapest { from, to } => {
            handle_cheapest(&database, CheapestCommandArgs { from, to }, cli.format)
        }
    }
}
