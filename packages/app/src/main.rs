#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `globe`: plays the field report dataset headless in the terminal.
//!
//! Uses `indicatif-log-bridge` (via [`globe_cli_utils::init_logger`]) so
//! per-month log lines and the month progress bar share the terminal.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use globe_app::headless::{HeadlessViewFactory, StderrSurface};
use globe_app::runner::{RunOutcome, run_realtime};
use globe_app::summary::{DatasetSummary, write_counts};
use globe_app::{AppConfig, Bootstrap};
use globe_cli_utils::IndicatifProgress;

/// Wall-clock interval between session clock updates.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "globe", about = "Field report globe playback")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the dataset month by month
    Play {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Dataset path or URL (overrides `sources.dataset`)
        #[arg(long)]
        dataset: Option<String>,
        /// Credential endpoint (overrides `sources.token_url`)
        #[arg(long)]
        token_url: Option<String>,
        /// Speed multiplier
        #[arg(long, default_value = "1")]
        speed: u32,
        /// Start paused at this month index, then play from there
        #[arg(long)]
        seek: Option<usize>,
    },
    /// Print totals for the whole dataset
    Summary {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Dataset path or URL (overrides `sources.dataset`)
        #[arg(long)]
        dataset: Option<String>,
    },
}

fn load_config(
    path: Option<&PathBuf>,
    dataset: Option<String>,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load_or_default(path.map(PathBuf::as_path))?;
    if let Some(dataset) = dataset {
        config.sources.dataset = dataset;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = globe_cli_utils::init_logger();
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Play {
            config,
            dataset,
            token_url,
            speed,
            seek,
        } => {
            let mut config = load_config(config.as_ref(), dataset)?;
            if token_url.is_some() {
                config.sources.token_url = token_url;
            }

            let bootstrap = Bootstrap::from_config(&config, client);
            let mut session = bootstrap
                .initialize(&mut HeadlessViewFactory, &mut StderrSurface)
                .await?;

            session.set_speed(speed);
            if let Some(index) = seek {
                session.seek(index);
            }
            session.play();

            let progress = IndicatifProgress::months_bar(&multi, "Playing");
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            };
            let outcome = run_realtime(&mut session, &progress, FRAME, shutdown).await;

            if outcome == RunOutcome::Interrupted {
                println!("Stopped at {}", session.readout().current_month);
            }
            println!();
            println!("Cumulative reports by category:");
            let mut out = String::new();
            write_counts(&mut out, session.counts())?;
            print!("{out}");
        }
        Commands::Summary { config, dataset } => {
            let config = load_config(config.as_ref(), dataset)?;
            let dataset = config
                .dataset_source()
                .load(&client, config.fetch_timeout())
                .await?;
            print!("{}", DatasetSummary::new(&dataset));
        }
    }

    Ok(())
}
