use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Reads `ORION_*` settings, picking up a `.env` file in the working
/// directory first if there is one.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Same as [`load_app_config`] without touching `.env`.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Every variable has a default, so an empty environment yields a usable
/// development config pointed at a local backend.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw.trim_end_matches('/').to_string())
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected an http(s) URL, got \"{raw}\""),
            })
        }
    };

    let env = parse_environment(&or_default("ORION_ENV", "development"))?;
    let log_level = or_default("ORION_LOG_LEVEL", "info");

    let api_base_url = parse_url("ORION_API_BASE_URL", "http://localhost:3000/api")?;
    let api_timeout_secs = parse_u64("ORION_API_TIMEOUT_SECS", "10")?;
    let api_max_retries = parse_u32("ORION_API_MAX_RETRIES", "2")?;
    let api_retry_backoff_base_ms = parse_u64("ORION_API_RETRY_BACKOFF_BASE_MS", "500")?;
    let api_token = lookup("ORION_API_TOKEN").ok().filter(|t| !t.trim().is_empty());

    let geocoder_base_url =
        parse_url("ORION_GEOCODER_BASE_URL", "https://nominatim.openstreetmap.org")?;
    let geocoder_timeout_secs = parse_u64("ORION_GEOCODER_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("ORION_USER_AGENT", "orion/0.1 (crop-planner)");

    let picker_debounce_ms = parse_u64("ORION_PICKER_DEBOUNCE_MS", "800")?;
    if picker_debounce_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ORION_PICKER_DEBOUNCE_MS".to_string(),
            reason: "debounce window must be greater than zero".to_string(),
        });
    }

    let session_path = PathBuf::from(or_default("ORION_SESSION_PATH", "./.orion/session.json"));

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        api_timeout_secs,
        api_max_retries,
        api_retry_backoff_base_ms,
        api_token,
        geocoder_base_url,
        geocoder_timeout_secs,
        user_agent,
        picker_debounce_ms,
        session_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ORION_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
