//! `orion locations`: list, add through the location picker, remove.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Subcommand};
use orion_api::ApiClient;
use orion_core::{AppConfig, Location, UserUpdate};
use orion_geocode::GeocodeClient;
use orion_picker::{
    LocationDraft, LocationPicker, LocationSink, PersistFuture, PickerError, PickerOptions,
};

use crate::session::{self, Session};

#[derive(Debug, Subcommand)]
pub enum LocationsCommands {
    /// List saved farm locations
    List,
    /// Pick a location and save it
    Add(AddArgs),
    /// Delete a saved location
    Remove {
        /// Location id as shown by `locations list`
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Farm name
    #[arg(long)]
    pub name: String,
    /// Latitude typed into the coordinate field
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<String>,
    /// Longitude typed into the coordinate field
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<String>,
    /// Simulated map click, `LAT,LNG`
    #[arg(long, value_parser = parse_click, allow_hyphen_values = true, conflicts_with_all = ["lat", "lng"])]
    pub click: Option<(f64, f64)>,
    /// Country to search for
    #[arg(long)]
    pub country: Option<String>,
    /// Region (state, city) to search for
    #[arg(long, requires = "country")]
    pub region: Option<String>,
    /// Skip the geocoding service; points are labelled by their coordinates
    #[arg(long)]
    pub no_geocode: bool,
}

pub(crate) fn parse_click(raw: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got {raw:?}"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad longitude {lng:?}: {e}"))?;
    Ok((lat, lng))
}

/// Persists picker drafts through `POST /locations`.
struct ApiSink<'a> {
    api: &'a ApiClient,
    id_user: &'a str,
}

impl LocationSink for ApiSink<'_> {
    fn persist<'a>(&'a self, draft: &'a LocationDraft) -> PersistFuture<'a> {
        Box::pin(async move {
            let body = draft.clone().into_create(self.id_user);
            self.api.create_location(&body).await.map_err(Into::into)
        })
    }
}

pub(crate) async fn run_locations(
    config: &AppConfig,
    command: LocationsCommands,
) -> anyhow::Result<()> {
    let session = session::require(config)?;
    let api = session::api_client(config, &session)?;
    match command {
        LocationsCommands::List => {
            let locations = api.list_locations(&session.user.id).await?;
            print_locations(&locations);
        }
        LocationsCommands::Add(args) => run_add(config, &api, &session, args).await?,
        LocationsCommands::Remove { id } => {
            let remaining = api
                .delete_location(&session.user.id, &id)
                .await
                .with_context(|| format!("failed to remove location {id}"))?;
            println!("location removed; {} remaining", remaining.len());
            print_locations(&remaining);
        }
    }
    Ok(())
}

fn print_locations(locations: &[Location]) {
    if locations.is_empty() {
        println!("no locations saved; add one with `orion locations add`");
        return;
    }
    println!("{:<26}{:<13}{:<13}NAME", "ID", "LATITUDE", "LONGITUDE");
    for location in locations {
        println!(
            "{:<26}{:<13.6}{:<13.6}{}",
            location.id, location.latitude, location.longitude, location.display_name
        );
    }
}

/// Feeds the arguments to a picker the way the dialog would receive them,
/// lets the debounce windows run out, then saves.
async fn run_add(
    config: &AppConfig,
    api: &ApiClient,
    session: &Session,
    args: AddArgs,
) -> anyhow::Result<()> {
    let options = PickerOptions {
        debounce: Duration::from_millis(config.picker_debounce_ms),
        reverse_geocode: !args.no_geocode,
        forward_search: !args.no_geocode,
    };
    let mut picker = LocationPicker::new(options);
    if !args.no_geocode {
        let geocoder = GeocodeClient::new(
            &config.geocoder_base_url,
            config.geocoder_timeout_secs,
            &config.user_agent,
        )?;
        picker = picker.with_geocoder(Arc::new(geocoder));
    }

    picker.open();
    picker.set_farm_name(args.name);
    if let Some((lat, lng)) = args.click {
        if let Some(lookup) = picker.map_click(lat, lng) {
            picker.perform(lookup).await;
        }
    }
    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        picker.set_latitude_text(lat);
        picker.set_longitude_text(lng);
    }
    if let Some(region) = args.region {
        picker.set_region_text(region);
    }
    if let Some(country) = args.country {
        picker.set_country_text(country);
    }
    picker.settle().await;

    if let Some(selected) = picker.selected() {
        println!("selected: {} ({})", selected.display_name, selected.coordinates);
    }

    let sink = ApiSink {
        api,
        id_user: &session.user.id,
    };
    let draft = match picker.save(&sink).await {
        Ok(draft) => draft,
        Err(PickerError::NotReady(blockers)) => {
            let reasons: Vec<String> = blockers.iter().map(ToString::to_string).collect();
            anyhow::bail!("cannot save location: {}", reasons.join(", "));
        }
        Err(e) => return Err(e).context("failed to save location"),
    };
    println!("saved \"{}\" at {}", draft.display_name, draft.coordinates);

    if session.user.is_onboarding {
        api.update_user(
            Some(&session.user.id),
            &UserUpdate::finish_onboarding(&session.user),
        )
        .await
        .context("location saved but onboarding flag could not be cleared")?;
        session::refresh(config, api, session).await?;
        tracing::info!(user = %session.user.id, "onboarding finished");
    }
    Ok(())
}
