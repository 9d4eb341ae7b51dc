mod dashboard;
mod locations;
mod profile;
mod session;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use orion_core::Month;
use tracing_subscriber::EnvFilter;

use crate::locations::LocationsCommands;
use crate::profile::ProfileCommands;
use crate::session::SessionCommands;

#[derive(Debug, Parser)]
#[command(name = "orion")]
#[command(about = "Plan crop planting windows for your farms")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in, inspect or forget the cached session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Manage farm locations
    Locations {
        #[command(subcommand)]
        command: LocationsCommands,
    },
    /// Request a planting-window prediction
    Predict {
        /// Crop to plant (e.g. corn, soy)
        #[arg(long)]
        crop: String,
        /// Location id as shown by `locations list`
        #[arg(long)]
        location: String,
        /// Month to start planting, in English or Portuguese
        #[arg(long)]
        month: Month,
    },
    /// Show prediction history and a request's calendar
    Dashboard {
        /// Request id; defaults to the most recent
        #[arg(long)]
        request: Option<String>,
    },
    /// Show environmental details for one calendar day
    Day {
        #[arg(long)]
        request: String,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
    },
    /// Update account details
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = orion_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, api = %config.api_base_url, "configuration loaded");

    match cli.command {
        Commands::Session { command } => session::run_session(&config, command).await?,
        Commands::Locations { command } => locations::run_locations(&config, command).await?,
        Commands::Predict {
            crop,
            location,
            month,
        } => dashboard::run_predict(&config, &crop, &location, month).await?,
        Commands::Dashboard { request } => {
            dashboard::run_dashboard(&config, request.as_deref()).await?;
        }
        Commands::Day { request, date } => dashboard::run_day(&config, &request, date).await?,
        Commands::Profile { command } => profile::run_profile(&config, command).await?,
    }

    Ok(())
}
