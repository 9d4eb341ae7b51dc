//! Prediction requests and the per-day calendar returned by `/dashboard`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    #[must_use]
    pub fn from_number(month: u32) -> Option<Self> {
        let index = usize::try_from(month.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }

    /// Portuguese month name. The prediction service buckets calendars
    /// with these keys.
    #[must_use]
    pub fn pt_name(self) -> &'static str {
        match self {
            Month::January => "janeiro",
            Month::February => "fevereiro",
            Month::March => "março",
            Month::April => "abril",
            Month::May => "maio",
            Month::June => "junho",
            Month::July => "julho",
            Month::August => "agosto",
            Month::September => "setembro",
            Month::October => "outubro",
            Month::November => "novembro",
            Month::December => "dezembro",
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Month {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == lower || m.pt_name() == lower)
            .ok_or_else(|| CoreError::InvalidMonth(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

/// One prediction request in the dashboard history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub id_user: String,
    pub crop: String,
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Compact `YYYYMMDD` date.
    pub date: String,
    /// Suitability score in `0.0..=1.0`.
    pub status: f64,
    #[serde(default)]
    pub prediction_data: BTreeMap<String, f64>,
}

/// A prediction request together with its per-day calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequestDetails {
    #[serde(flatten)]
    pub request: DashboardRequest,
    #[serde(default)]
    pub calendar: BTreeMap<String, Vec<CalendarDay>>,
}

impl DashboardRequestDetails {
    /// Finds the calendar entry for `date`.
    ///
    /// Looks in the month bucket first (English or Portuguese key), then
    /// scans every bucket in case the backend grouped the day elsewhere.
    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        let matches = |day: &&CalendarDay| parse_compact_date(&day.date).ok() == Some(date);

        let bucket = Month::from_number(date.month()).and_then(|month| {
            self.calendar
                .get(month.name())
                .or_else(|| self.calendar.get(month.pt_name()))
        });

        if let Some(found) = bucket.and_then(|days| days.iter().find(matches)) {
            return Some(found);
        }

        self.calendar.values().flatten().find(matches)
    }

    #[must_use]
    pub fn status_for(&self, date: NaiveDate) -> Option<DayStatus> {
        self.day(date).map(|day| DayStatus::from_score(day.status))
    }

    /// First day of the prediction window, used to pick the month to show.
    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        let range = self.request.date_range.as_ref()?;
        parse_compact_date(&range.start_date).ok()
    }
}

/// Traffic-light bucket for a day's suitability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Green,
    Yellow,
    Red,
}

impl DayStatus {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            DayStatus::Green
        } else if score >= 0.4 {
            DayStatus::Yellow
        } else {
            DayStatus::Red
        }
    }

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            DayStatus::Green => 'G',
            DayStatus::Yellow => 'Y',
            DayStatus::Red => 'R',
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayStatus::Green => write!(f, "green"),
            DayStatus::Yellow => write!(f, "yellow"),
            DayStatus::Red => write!(f, "red"),
        }
    }
}

/// Inserts dashes into a compact `YYYYMMDD` date. Anything else is returned as-is.
#[must_use]
pub fn format_compact_date(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() == 8 && bytes.iter().all(u8::is_ascii_digit) {
        format!("{}-{}-{}", &raw[0..4], &raw[4..6], &raw[6..8])
    } else {
        raw.to_string()
    }
}

/// Parses `YYYYMMDD` or `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDate`] when neither form matches.
pub fn parse_compact_date(raw: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(&format_compact_date(raw.trim()), "%Y-%m-%d")
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

/// Renders one environmental metric with its unit.
///
/// Moisture arrives as a fraction and is shown as a percentage.
#[must_use]
pub fn metric_display(metric: &str, value: f64) -> String {
    let label = capitalize(metric);
    match metric {
        "moisture" => format!("{label}: {:.1}%", value * 100.0),
        "temperature" => format!("{label}: {value}°C"),
        "precipitation" => format!("{label}: {value}mm"),
        _ => format!("{label}: {value}"),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Body of `POST /prediction`.
///
/// Coordinates travel as strings, matching what the prediction service expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub id_user: String,
    pub latitude: String,
    pub longitude: String,
    pub crop_type: String,
    pub start_month: Month,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionCreated {
    pub id_request: String,
}
