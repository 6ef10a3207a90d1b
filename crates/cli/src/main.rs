//! aqsense CLI - virtual air quality sensor
//!
//! Estimates PM2.5 at any coordinate from nearby measurement stations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use aqsense_algorithms::interpolation::Engine;
use aqsense_algorithms::validation::leave_one_out;
use aqsense_core::io::{read_readings_path, read_station_table_path};
use aqsense_core::prepare::prepare_reference;
use aqsense_core::{Coordinate, ReferenceSet};

mod batch;
mod config;
mod interactive;
mod report;

use config::Config;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "aqsense")]
#[command(author, version, about = "Virtual air quality sensor", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (TOML)
    #[arg(short, long, global = true, default_value = "aqsense.toml")]
    config: PathBuf,

    /// Readings CSV, overriding the config file
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Calendar year to aggregate, overriding the config file
    #[arg(long, global = true, conflicts_with = "all_years")]
    year: Option<i32>,

    /// Aggregate readings from every year
    #[arg(long, global = true)]
    all_years: bool,

    /// Number of neighbors, overriding the config file
    #[arg(short, long, global = true)]
    k: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate PM2.5 at one coordinate
    Predict {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// List the stations used and their weights
        #[arg(short, long)]
        explain: bool,
    },
    /// Prompt for coordinates or preset locations
    Interactive,
    /// Estimate every coordinate in a CSV with lat,lon columns
    Batch {
        /// Input CSV
        input: PathBuf,
        /// Output CSV (stdout when omitted)
        output: Option<PathBuf>,
    },
    /// List the prepared stations
    Stations,
    /// Leave-one-out cross-validation of the stations
    Validate,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if cli.config.exists() {
        info!("Using config {}", cli.config.display());
        Config::load_from_file(&cli.config)?
    } else {
        debug!("{} not found, using defaults", cli.config.display());
        Config::default()
    };

    if let Some(data) = &cli.data {
        config.data.readings = Some(data.clone());
    }
    if let Some(year) = cli.year {
        config.data.prepare.year = Some(year);
    }
    if cli.all_years {
        config.data.prepare.year = None;
    }
    if let Some(k) = cli.k {
        config.engine.k = k;
    }
    Ok(config)
}

fn load_reference(config: &Config) -> Result<ReferenceSet> {
    let mut table = config.stations.clone();
    if let Some(path) = &config.data.station_table {
        table.merge(read_station_table_path(path).context("Failed to read station table")?);
    }
    if table.is_empty() {
        anyhow::bail!("No station coordinates configured. Add a [stations] table to the config.");
    }

    let readings_path: &Path = config
        .data
        .readings
        .as_deref()
        .context("No readings file configured")?;

    let pb = spinner("Loading air quality data...");
    let readings = read_readings_path(readings_path, &config.data.columns)
        .with_context(|| format!("Failed to read {}", readings_path.display()));
    pb.finish_and_clear();
    let readings = readings?;

    let prepared = prepare_reference(&readings, &table, &config.data.prepare)
        .context("Failed to prepare stations")?;
    let reference = prepared
        .into_reference_set()
        .context("No station has usable data")?;

    info!("Data prepared: {} sensor stations active", reference.len());
    Ok(reference)
}

fn build_engine(config: &Config) -> Result<Engine> {
    let reference = load_reference(config)?;
    Engine::with_params(reference, config.engine_params()).context("Failed to build engine")
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Predict { lat, lon, explain } => {
            let engine = build_engine(&config)?;
            let prediction = engine
                .predict_detailed(Coordinate::new(lat, lon))
                .context("Prediction failed")?;
            let mut out = io::stdout().lock();
            report::write_estimate(&mut out, &engine, &prediction, explain)?;
        }

        Commands::Interactive => {
            let engine = build_engine(&config)?;
            let mut input = io::stdin().lock();
            let mut out = io::stdout().lock();
            interactive::run(&engine, &config.presets, &mut input, &mut out)?;
        }

        Commands::Batch { input, output } => {
            let engine = build_engine(&config)?;
            let reader = BufReader::new(
                File::open(&input).with_context(|| format!("Failed to open {}", input.display()))?,
            );
            let writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
                )),
                None => Box::new(io::stdout().lock()),
            };

            let start = Instant::now();
            let summary = batch::run(&engine, reader, writer)?;
            info!(
                "Estimated {} rows ({} failed) in {:.2?}",
                summary.rows,
                summary.failed,
                start.elapsed()
            );
            if let Some(path) = output {
                println!("Estimates saved to: {}", path.display());
            }
        }

        Commands::Stations => {
            let engine = build_engine(&config)?;
            let mut out = io::stdout().lock();
            report::write_stations(&mut out, engine.reference(), &engine)?;
        }

        Commands::Validate => {
            let reference = load_reference(&config)?;
            let start = Instant::now();
            let result = leave_one_out(&reference, &config.engine_params())
                .context("Validation failed")?;
            debug!("Validation took {:.2?}", start.elapsed());
            let mut out = io::stdout().lock();
            report::write_validation(&mut out, &result)?;
        }
    }

    Ok(())
}
