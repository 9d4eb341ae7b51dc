pub mod app_config;
pub mod config;
pub mod dashboard;
pub mod location;
pub mod user;
pub mod validate;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use dashboard::{
    format_compact_date, metric_display, parse_compact_date, CalendarDay, DashboardRequest,
    DashboardRequestDetails, DateRange, DayStatus, Month, PredictionCreated, PredictionRequest,
};
pub use location::{
    format_coordinate_label, parse_coordinate_text, round6, Coordinates, CreateLocation,
    Location, SelectedLocation, UNKNOWN_PLACE,
};
pub use user::{User, UserProfile, UserUpdate};
pub use validate::FieldError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid month: {0}")]
    InvalidMonth(String),

    #[error("invalid calendar date \"{0}\": expected YYYYMMDD")]
    InvalidDate(String),
}
