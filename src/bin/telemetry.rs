use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trip_telemetry::config::TelemetryConfig;
use trip_telemetry::osrm::OsrmClient;
use trip_telemetry::service::{self, LocationBatches, TelemetryService};

#[derive(Debug, Parser)]
#[command(author, version, about = "Process vehicle trip telemetry and route candidates")]
struct Args {
    /// JSON configuration file; TELEMETRY_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the configured OSRM instance for road snapping and directions
    #[arg(long, global = true)]
    osrm: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Process one location batch, or an array of independent batches
    Locations { input: PathBuf },
    /// Score route candidates, or look them up from an origin/destination
    Routes { input: PathBuf },
    /// Distances between coordinate pairs
    Distance { input: PathBuf },
    /// Fuel state after a traveled distance
    Fuel { input: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = TelemetryConfig::load(args.config.as_deref())?;

    let mut telemetry = TelemetryService::new(&config);
    if args.osrm {
        let client = OsrmClient::new(config.osrm.clone())?;
        tracing::info!("using OSRM at {}", client.config().base_url);
        telemetry = telemetry.with_snapper(client.clone()).with_directions(client);
    }

    match &args.command {
        Command::Locations { input } => {
            let batches: LocationBatches = service::parse(&read(input)?)?;
            let as_array = matches!(batches, LocationBatches::Many(_));
            let batches = batches.into_vec();
            let mut responses = Vec::with_capacity(batches.len());
            for result in telemetry.process_location_batches(&batches) {
                responses.push(result?);
            }
            match responses.as_slice() {
                [single] if !as_array => print_json(single)?,
                _ => print_json(&responses)?,
            }
        }
        Command::Routes { input } => {
            let request = service::parse(&read(input)?)?;
            print_json(&telemetry.process_routes(&request)?)?;
        }
        Command::Distance { input } => {
            let request = service::parse(&read(input)?)?;
            print_json(&telemetry.calculate_distance(&request)?)?;
        }
        Command::Fuel { input } => {
            let request = service::parse(&read(input)?)?;
            print_json(&telemetry.calculate_fuel(&request)?)?;
        }
    }

    Ok(())
}

fn read(path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
