use std::{fs, path::PathBuf, process::ExitCode};

use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use serde_json::Value;

use treno::client::{pick_candidate, ViaggiaTreno};
use treno::config::{Config, ConfigArgs};
use treno::data::TrainDescriptor;
use treno::error::Result;
use treno::journey::{JourneyView, Reconciler, RowClass};
use treno::stations::{Station, StationDirectory};
use treno::time::{self, Millis};

#[derive(Debug, Parser)]
#[command(name = "treno", about = "Italian train status from ViaggiaTreno.")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Activate debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch and reconcile the live status of a train
    Status {
        number: String,

        /// Origin station name or code, when the number runs from several
        #[arg(long)]
        from: Option<String>,

        /// Reference time instead of now (epoch ms, YYYYMMDDHHmm or ISO)
        #[arg(long)]
        at: Option<String>,
    },
    /// Reconcile a saved andamentoTreno payload
    Reconcile {
        file: PathBuf,

        #[arg(long)]
        at: Option<String>,
    },
    /// Look up stations by name prefix
    Stations { prefix: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::try_from(cli.config)?;
    let directory = match &config.stations {
        Some(path) => StationDirectory::from_path(path)?,
        None => StationDirectory::default(),
    };

    match cli.command {
        Command::Status { number, from, at } => {
            let now = reference_time(at.as_deref(), config.tz)?;
            let client = ViaggiaTreno::new(&config)?;
            let candidates = client.search_train(&number)?;
            let candidate = pick_candidate(&number, candidates, from.as_deref(), &directory)?;
            let train = client.fetch_train(&candidate)?;
            report(&train, now, config.tz, cli.json)
        }
        Command::Reconcile { file, at } => {
            let now = reference_time(at.as_deref(), config.tz)?;
            info!("Processing {}", file.display());
            let payload: Value = serde_json::from_str(&fs::read_to_string(&file)?)?;
            let train = TrainDescriptor::from_payload(&payload, config.tz)?;
            report(&train, now, config.tz, cli.json)
        }
        Command::Stations { prefix } => {
            let stations: Vec<Station> = if directory.is_empty() {
                ViaggiaTreno::new(&config)?.search_stations(&prefix)?
            } else {
                directory.search(&prefix).into_iter().cloned().collect()
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stations)?);
            } else {
                for station in &stations {
                    println!("{}\t{}", station.code, station.name);
                }
            }
            Ok(())
        }
    }
}

fn reference_time(at: Option<&str>, tz: Tz) -> Result<Millis> {
    Ok(at
        .map(|text| time::parse_arg(text, tz))
        .transpose()?
        .unwrap_or_else(time::now))
}

fn report(train: &TrainDescriptor, now: Millis, tz: Tz, json: bool) -> Result<()> {
    let view = Reconciler::new(train, now, tz).view();

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_table(&view, tz);
    }
    Ok(())
}

fn print_table(view: &JourneyView, tz: Tz) {
    println!("{}", view.summary());
    for stop in &view.stops {
        let marker = match stop.row {
            RowClass::Past => ' ',
            RowClass::Current => '>',
            RowClass::Future => '.',
        };
        println!(
            "{} {:<30} {:<16} {:<16} {}",
            marker,
            stop.station_name,
            stop.arrival.display(tz),
            stop.departure.display(tz),
            stop.platform.as_deref().unwrap_or("")
        );
    }
}
