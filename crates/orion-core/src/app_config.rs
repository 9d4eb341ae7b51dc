use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub api_max_retries: u32,
    pub api_retry_backoff_base_ms: u64,
    /// Bearer token used when no cached session exists.
    pub api_token: Option<String>,
    pub geocoder_base_url: String,
    pub geocoder_timeout_secs: u64,
    pub user_agent: String,
    pub picker_debounce_ms: u64,
    pub session_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("api_max_retries", &self.api_max_retries)
            .field("api_retry_backoff_base_ms", &self.api_retry_backoff_base_ms)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("picker_debounce_ms", &self.picker_debounce_ms)
            .field("session_path", &self.session_path)
            .finish()
    }
}
