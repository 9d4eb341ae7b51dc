use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "ORION_ENV"));
}

#[test]
fn build_app_config_defaults_from_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.api_base_url, "http://localhost:3000/api");
    assert_eq!(cfg.api_timeout_secs, 10);
    assert_eq!(cfg.api_max_retries, 2);
    assert_eq!(cfg.api_retry_backoff_base_ms, 500);
    assert!(cfg.api_token.is_none());
    assert_eq!(cfg.geocoder_base_url, "https://nominatim.openstreetmap.org");
    assert_eq!(cfg.geocoder_timeout_secs, 10);
    assert_eq!(cfg.user_agent, "orion/0.1 (crop-planner)");
    assert_eq!(cfg.picker_debounce_ms, 800);
    assert_eq!(cfg.session_path.to_str(), Some("./.orion/session.json"));
}

#[test]
fn build_app_config_strips_trailing_slash_from_urls() {
    let mut map = HashMap::new();
    map.insert("ORION_API_BASE_URL", "https://api.example.com/api/");
    map.insert("ORION_GEOCODER_BASE_URL", "https://geo.example.com/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url, "https://api.example.com/api");
    assert_eq!(cfg.geocoder_base_url, "https://geo.example.com");
}

#[test]
fn build_app_config_rejects_non_http_api_url() {
    let mut map = HashMap::new();
    map.insert("ORION_API_BASE_URL", "localhost:3000");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ORION_API_BASE_URL"),
        "expected InvalidEnvVar(ORION_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = HashMap::new();
    map.insert("ORION_API_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ORION_API_TIMEOUT_SECS"),
        "expected InvalidEnvVar(ORION_API_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_debounce_override() {
    let mut map = HashMap::new();
    map.insert("ORION_PICKER_DEBOUNCE_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.picker_debounce_ms, 250);
}

#[test]
fn build_app_config_rejects_zero_debounce() {
    let mut map = HashMap::new();
    map.insert("ORION_PICKER_DEBOUNCE_MS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ORION_PICKER_DEBOUNCE_MS"),
        "expected InvalidEnvVar(ORION_PICKER_DEBOUNCE_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_ignores_blank_token() {
    let mut map = HashMap::new();
    map.insert("ORION_API_TOKEN", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.api_token.is_none());
}

#[test]
fn build_app_config_retry_overrides() {
    let mut map = HashMap::new();
    map.insert("ORION_API_MAX_RETRIES", "5");
    map.insert("ORION_API_RETRY_BACKOFF_BASE_MS", "50");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_max_retries, 5);
    assert_eq!(cfg.api_retry_backoff_base_ms, 50);
}

#[test]
fn debug_output_redacts_token() {
    let mut map = HashMap::new();
    map.insert("ORION_API_TOKEN", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}
