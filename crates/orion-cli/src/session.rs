//! The cached session: bearer token plus the signed-in user, stored as JSON
//! at `ORION_SESSION_PATH`.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use orion_api::{ApiClient, StaticToken};
use orion_core::{AppConfig, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Subcommand)]
pub enum SessionCommands {
    /// Store a bearer token and the account it belongs to
    Login {
        /// Token issued by the identity provider
        #[arg(long, env = "ORION_LOGIN_TOKEN", hide_env_values = true)]
        token: String,
    },
    /// Show the cached account
    Show,
    /// Forget the cached token and account
    Logout,
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Session {
    pub token: String,
    pub user: User,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[redacted]")
            .field("user", &self.user)
            .finish()
    }
}

/// Reads the session file. A missing file means signed out.
pub(crate) fn load(path: &Path) -> anyhow::Result<Option<Session>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read session {}", path.display()))
        }
    };
    let session = serde_json::from_str(&raw)
        .with_context(|| format!("session file {} is corrupt; run `orion session logout`", path.display()))?;
    Ok(Some(session))
}

pub(crate) fn save(path: &Path, session: &Session) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write session {}", path.display()))?;
    Ok(())
}

/// Removes the session file. Returns whether one existed.
pub(crate) fn clear(path: &Path) -> anyhow::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("failed to remove session {}", path.display())),
    }
}

/// Loads the session or explains how to create one.
pub(crate) fn require(config: &AppConfig) -> anyhow::Result<Session> {
    load(&config.session_path)?
        .ok_or_else(|| anyhow::anyhow!("not signed in; run `orion session login --token <TOKEN>` first"))
}

/// Backend client authorised with `ORION_API_TOKEN` if set, else the session token.
pub(crate) fn api_client(config: &AppConfig, session: &Session) -> anyhow::Result<ApiClient> {
    let token = config.api_token.as_deref().unwrap_or(&session.token);
    client_with_token(config, token)
}

pub(crate) fn client_with_token(config: &AppConfig, token: &str) -> anyhow::Result<ApiClient> {
    let client = ApiClient::new(
        &config.api_base_url,
        config.api_timeout_secs,
        &config.user_agent,
        config.api_max_retries,
        config.api_retry_backoff_base_ms,
    )?
    .with_token_source(Arc::new(StaticToken::new(token)));
    Ok(client)
}

/// Re-fetches the account and rewrites the session file.
pub(crate) async fn refresh(
    config: &AppConfig,
    api: &ApiClient,
    session: &Session,
) -> anyhow::Result<Session> {
    let profile = api
        .current_user()
        .await
        .context("failed to reload the signed-in account")?;
    let refreshed = Session {
        token: session.token.clone(),
        user: profile.user,
    };
    save(&config.session_path, &refreshed)?;
    Ok(refreshed)
}

pub(crate) async fn run_session(config: &AppConfig, command: SessionCommands) -> anyhow::Result<()> {
    match command {
        SessionCommands::Login { token } => {
            let api = client_with_token(config, &token)?;
            let profile = api
                .current_user()
                .await
                .context("token was not accepted by the backend")?;
            let session = Session {
                token,
                user: profile.user,
            };
            save(&config.session_path, &session)?;
            tracing::info!(user = %session.user.id, "session stored");
            println!("signed in as {} <{}>", session.user.name, session.user.email);
            if session.user.is_onboarding {
                println!("no farm registered yet; add one with `orion locations add`");
            }
        }
        SessionCommands::Show => match load(&config.session_path)? {
            Some(session) => {
                println!("user:        {} <{}>", session.user.name, session.user.email);
                println!("id:          {}", session.user.id);
                println!("onboarding:  {}", session.user.is_onboarding);
                println!("session:     {}", config.session_path.display());
            }
            None => println!("not signed in"),
        },
        SessionCommands::Logout => {
            if clear(&config.session_path)? {
                println!("signed out");
            } else {
                println!("not signed in");
            }
        }
    }
    Ok(())
}
