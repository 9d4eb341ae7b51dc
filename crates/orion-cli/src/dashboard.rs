//! Prediction requests and their suitability calendars.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use orion_core::validate;
use orion_core::{
    format_compact_date, metric_display, parse_compact_date, AppConfig, DashboardRequest,
    DashboardRequestDetails, DayStatus, Month, PredictionRequest,
};

use crate::session;

const WEEKDAY_HEADER: &str = "Mo  Tu  We  Th  Fr  Sa  Su";

/// `orion predict`: asks the backend for a planting-window prediction.
pub(crate) async fn run_predict(
    config: &AppConfig,
    crop: &str,
    location_id: &str,
    month: Month,
) -> anyhow::Result<()> {
    if let Err(errors) = validate::prediction_search(crop, location_id) {
        let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("invalid prediction request: {}", reasons.join("; "));
    }
    let session = session::require(config)?;
    let api = session::api_client(config, &session)?;

    let locations = api.list_locations(&session.user.id).await?;
    let location = locations
        .iter()
        .find(|l| l.id == location_id)
        .ok_or_else(|| {
            anyhow::anyhow!("location '{location_id}' not found; see `orion locations list`")
        })?;

    let request = PredictionRequest {
        id_user: session.user.id.clone(),
        latitude: location.latitude.to_string(),
        longitude: location.longitude.to_string(),
        crop_type: crop.trim().to_string(),
        start_month: month,
    };
    let created = api
        .create_prediction(&request)
        .await
        .context("prediction request failed")?;
    println!(
        "prediction requested for {} at {} from {}: {}",
        request.crop_type, location.display_name, month, created.id_request
    );
    println!("view it with `orion dashboard --request {}`", created.id_request);
    Ok(())
}

/// `orion dashboard`: request history plus the calendar of one request.
pub(crate) async fn run_dashboard(
    config: &AppConfig,
    request_id: Option<&str>,
) -> anyhow::Result<()> {
    let session = session::require(config)?;
    let api = session::api_client(config, &session)?;

    let requests = api.list_requests(&session.user.id).await?;
    if requests.is_empty() {
        println!("no predictions yet; request one with `orion predict`");
        return Ok(());
    }
    print_requests(&requests);

    let Some(selected) = request_id.or_else(|| requests.first().map(|r| r.id.as_str())) else {
        return Ok(());
    };
    let details = api
        .request_details(&session.user.id, selected)
        .await?
        .ok_or_else(|| anyhow::anyhow!("request '{selected}' not found"))?;

    println!();
    println!("{} ({})", details.request.crop, details.request.id);
    for (year, month) in calendar_months(&details) {
        println!();
        print!("{}", render_month(&details, year, month));
    }
    println!();
    println!("G = good, Y = fair, R = poor");
    Ok(())
}

/// `orion day`: environmental readings behind one calendar day.
pub(crate) async fn run_day(
    config: &AppConfig,
    request_id: &str,
    date: NaiveDate,
) -> anyhow::Result<()> {
    let session = session::require(config)?;
    let api = session::api_client(config, &session)?;

    let details = api
        .request_details(&session.user.id, request_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("request '{request_id}' not found"))?;
    let Some(day) = details.day(date) else {
        anyhow::bail!("no prediction for {date} in request '{request_id}'");
    };

    let status = DayStatus::from_score(day.status);
    println!("{} {} ({status})", details.request.crop, format_compact_date(&day.date));
    for (metric, value) in &day.prediction_data {
        println!("  {}", metric_display(metric, *value));
    }
    Ok(())
}

fn print_requests(requests: &[DashboardRequest]) {
    println!("{:<26}{:<14}{:<12}END", "ID", "CROP", "START");
    for request in requests {
        let (start, end) = request.date_range.as_ref().map_or_else(
            || ("-".to_string(), "-".to_string()),
            |r| (format_compact_date(&r.start_date), format_compact_date(&r.end_date)),
        );
        println!("{:<26}{:<14}{:<12}{}", request.id, request.crop, start, end);
    }
}

/// Distinct months covered by the calendar, oldest first.
pub(crate) fn calendar_months(details: &DashboardRequestDetails) -> Vec<(i32, u32)> {
    let mut months: BTreeSet<(i32, u32)> = details
        .calendar
        .values()
        .flatten()
        .filter_map(|day| parse_compact_date(&day.date).ok())
        .map(|date| (date.year(), date.month()))
        .collect();
    if months.is_empty() {
        if let Some(start) = details.start_date() {
            months.insert((start.year(), start.month()));
        }
    }
    months.into_iter().collect()
}

/// Renders one month as a Monday-first grid. Days with a prediction carry
/// their status letter.
pub(crate) fn render_month(details: &DashboardRequestDetails, year: i32, month: u32) -> String {
    let mut out = String::new();
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return out;
    };
    let title = Month::from_number(month).map_or("", Month::name);
    let _ = writeln!(out, "{} {year}", capitalize(title));
    let _ = writeln!(out, "{WEEKDAY_HEADER}");

    let offset = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<String> = vec!["   ".to_string(); offset];
    let mut date = first;
    while date.month() == month {
        let letter = details.status_for(date).map_or(' ', DayStatus::letter);
        cells.push(format!("{:>2}{letter}", date.day()));
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    for week in cells.chunks(7) {
        let _ = writeln!(out, "{}", week.join(" ").trim_end());
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> DashboardRequestDetails {
        serde_json::from_value(serde_json::json!({
            "_id": "r1",
            "id_user": "u1",
            "crop": "corn",
            "date_range": { "start_date": "20250301", "end_date": "20250430" },
            "calendar": {
                "march": [
                    { "date": "20250301", "status": 0.9 },
                    { "date": "20250303", "status": 0.5 },
                    { "date": "20250331", "status": 0.1 }
                ],
                "abril": [
                    { "date": "20250401", "status": 0.75 }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn months_are_sorted_and_distinct() {
        assert_eq!(calendar_months(&details()), vec![(2025, 3), (2025, 4)]);
    }

    #[test]
    fn months_fall_back_to_start_date() {
        let mut d = details();
        d.calendar.clear();
        assert_eq!(calendar_months(&d), vec![(2025, 3)]);
    }

    #[test]
    fn march_2025_grid() {
        // 1 March 2025 is a Saturday.
        let grid = render_month(&details(), 2025, 3);
        let lines: Vec<&str> = grid.lines().collect();
        assert_eq!(lines[0], "March 2025");
        assert_eq!(lines[1], WEEKDAY_HEADER);
        assert_eq!(lines[2], "                     1G  2");
        assert!(lines[3].starts_with(" 3Y  4 "), "{:?}", lines[3]);
        assert_eq!(lines.last().copied(), Some("31R"));
    }

    #[test]
    fn portuguese_bucket_is_found() {
        let grid = render_month(&details(), 2025, 4);
        assert!(grid.contains(" 1G"), "{grid}");
    }
}
