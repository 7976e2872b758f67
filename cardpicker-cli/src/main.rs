//! Cardpicker CLI
//!
//! Command-line interface that picks random Hearthstone cards from the
//! Blizzard catalog and prints them.
//!
//! # Usage
//!
//! ```bash
//! # Pick ten 7-mana legendary warlock/druid cards
//! CARDPICKER_CLIENT_ID=... CARDPICKER_CLIENT_SECRET=... cardpicker
//!
//! # Override the filters and print JSON
//! cardpicker pick --no-default-criteria -F manaCost=3 -F class=4,7 --format json
//!
//! # Show the effective configuration
//! cardpicker show-config
//! ```

mod config;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cardpicker_core::{CancelSignal, CardPicker, CriteriaValue};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::CliConfig;
use crate::render::OutputFormat;

#[derive(Parser)]
#[command(name = "cardpicker")]
#[command(about = "Pick random Hearthstone cards from the Blizzard catalog")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    // Pick options used when no subcommand is given
    #[command(flatten)]
    pick: PickArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the filtered catalog and print a random sample (default)
    Pick(PickArgs),

    /// Print the effective configuration with secrets masked
    ShowConfig,
}

#[derive(Args)]
struct PickArgs {
    /// OAuth client identifier
    #[arg(long, env = "CARDPICKER_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "CARDPICKER_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Number of cards to print
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Maximum number of catalog pages to fetch
    #[arg(long)]
    page_limit: Option<u32>,

    /// Catalog locale (e.g., en_US, de_DE)
    #[arg(long)]
    locale: Option<String>,

    /// Seed the sampler for a reproducible pick
    #[arg(long)]
    seed: Option<u64>,

    /// Extra filter as KEY=VALUE; a comma-separated value is sent as a list
    #[arg(short = 'F', long = "filter", value_parser = config::parse_filter)]
    filters: Vec<(String, CriteriaValue)>,

    /// Start from an empty filter set instead of the configured one
    #[arg(long)]
    no_default_criteria: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    init_logging(cli.verbose, &config.log_level);
    debug!("Loaded configuration from {:?}", config.config_path);

    match cli.command.unwrap_or(Commands::Pick(cli.pick)) {
        Commands::Pick(args) => pick(config, args).await,
        Commands::ShowConfig => show_config(&config),
    }
}

fn init_logging(verbose: bool, default_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn pick(config: CliConfig, args: PickArgs) -> Result<()> {
    let credentials = config.credentials(args.client_id, args.client_secret);

    let mut endpoints = config.endpoints.clone();
    if let Some(locale) = args.locale {
        endpoints.locale = locale;
    }

    let mut criteria = if args.no_default_criteria {
        Default::default()
    } else {
        config.criteria.clone()
    };
    for (key, value) in args.filters {
        criteria.insert(key, value);
    }

    let mut builder = CardPicker::builder()
        .endpoints(endpoints)
        .page_limit(args.page_limit.unwrap_or(config.page_limit))
        .sample_size(args.count.unwrap_or(config.sample_size))
        .timeout(config.timeout());
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let picker = builder.build().context("Invalid configuration")?;

    let (handle, signal) = CancelSignal::pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping");
            handle.cancel();
        }
    });

    let cards = picker
        .pick_with_cancel(&credentials, &criteria, &signal)
        .await
        .context("Failed to pick cards")?;

    print!("{}", render::render(&cards, args.format)?);
    Ok(())
}

fn show_config(config: &CliConfig) -> Result<()> {
    println!("# {}", config.config_path.display());
    print!("{}", config.to_redacted_toml()?);
    Ok(())
}
