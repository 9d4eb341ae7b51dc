//! `orion profile`: account details.

use anyhow::Context;
use clap::Subcommand;
use orion_core::{validate, AppConfig, UserUpdate};

use crate::session::{self, Session};

#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    /// Change the display name
    Update {
        #[arg(long)]
        name: String,
    },
}

pub(crate) async fn run_profile(config: &AppConfig, command: ProfileCommands) -> anyhow::Result<()> {
    let ProfileCommands::Update { name } = command;
    validate::profile_name(&name).map_err(|e| anyhow::anyhow!("invalid name: {}", e.message))?;

    let current = session::require(config)?;
    let api = session::api_client(config, &current)?;
    let update = UserUpdate {
        name: Some(name.trim().to_string()),
        email: Some(current.user.email.clone()),
        is_onboarding: Some(false),
        id_user: None,
    };
    let profile = api
        .update_user(None, &update)
        .await
        .context("failed to update profile")?;

    let refreshed = Session {
        token: current.token,
        user: profile.user,
    };
    session::save(&config.session_path, &refreshed)?;
    println!("profile updated: {} <{}>", refreshed.user.name, refreshed.user.email);
    Ok(())
}
