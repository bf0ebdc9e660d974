#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted Elemental Farm session headlessly.

mod farmer;
mod summary;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use elemental_farm_core::PlantType;
use elemental_farm_session::{FarmConfig, Session};
use tracing::info;
use tracing_subscriber::EnvFilter;

use farmer::{Farmer, Strategy};
use summary::{Counts, Summary};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless Elemental Farm session runner")]
struct Cli {
    /// Path to a farm configuration TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 180)]
    seconds: u64,

    /// Length of one simulation tick in milliseconds
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Crop the scripted farmer plants
    #[arg(long, value_enum, default_value_t = CropChoice::Rotate)]
    crop: CropChoice,

    /// Override the lightning seed from the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Start with onboarding already finished
    #[arg(long)]
    skip_onboarding: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CropChoice {
    Rotate,
    Random,
    Pumpkin,
    Potato,
    Carrot,
    Tomato,
}

impl From<CropChoice> for Strategy {
    fn from(choice: CropChoice) -> Self {
        match choice {
            CropChoice::Rotate => Strategy::Rotate,
            CropChoice::Random => Strategy::Random,
            CropChoice::Pumpkin => Strategy::Only(PlantType::Pumpkin),
            CropChoice::Potato => Strategy::Only(PlantType::Potato),
            CropChoice::Carrot => Strategy::Only(PlantType::Carrot),
            CropChoice::Tomato => Strategy::Only(PlantType::Tomato),
        }
    }
}

/// Entry point for the Elemental Farm command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let summary = run(&cli)?;
    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{json}");
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<FarmConfig> {
    let mut config = match &cli.config {
        Some(path) => FarmConfig::load(path)
            .with_context(|| format!("failed to load farm configuration {}", path.display()))?,
        None => FarmConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.weather.seed = seed;
    }
    if cli.skip_onboarding {
        config.farm.skip_onboarding = true;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<Summary> {
    if cli.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }

    let config = load_config(cli)?;
    let mut session = Session::new(&config).context("failed to start farming session")?;
    let mut farmer = Farmer::new(cli.crop.into(), config.weather.seed);
    let dt = Duration::from_millis(cli.tick_ms);
    let ticks = cli.seconds.saturating_mul(1_000) / cli.tick_ms;
    info!(ticks, tick_ms = cli.tick_ms, crop = ?cli.crop, "running session");

    let mut counts = Counts::default();
    for _ in 0..ticks {
        farmer.work(&mut session);
        session.tick(dt);
        counts.observe(&session.drain_events());
    }

    Ok(Summary::capture(&session, counts))
}
