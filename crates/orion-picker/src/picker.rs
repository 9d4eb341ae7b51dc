//! The location picker dialog as a single-owner state machine.
//!
//! User input arrives through the `set_*` and [`LocationPicker::map_click`]
//! methods. Text input is debounced per channel; when a window expires the
//! picker runs [`reconcile`] and may ask for a geocoding [`Lookup`]. Lookups
//! are performed by the caller (or by [`LocationPicker::perform`]) and fed
//! back with the ticket they were issued under. Only the most recently
//! issued ticket is honoured, so a slow response can never overwrite a newer
//! selection.

use std::sync::Arc;
use std::time::Duration;

use orion_core::{validate, Coordinates, SelectedLocation};
use orion_geocode::{GeocodeError, Geocoder, Place};
use tokio::time::Instant;

use crate::debounce::Debounce;
use crate::error::PickerError;
use crate::reconcile::{reconcile, Channel, PickerFields, PickerInputs, Reconciliation};
use crate::sink::{LocationDraft, LocationSink};
use crate::suppress::SuppressToken;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct PickerOptions {
    /// Quiet period after the last keystroke before a channel reacts.
    pub debounce: Duration,
    /// Resolve clicked or typed points to a place name.
    pub reverse_geocode: bool,
    /// React to the country/region fields with a forward lookup.
    pub forward_search: bool,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            reverse_geocode: true,
            forward_search: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open { populated: bool },
}

/// How the last session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    Cancelled,
}

/// Why [`LocationPicker::can_save`] is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveBlocker {
    NoLocation,
    EmptyName,
    EmptyCoordinates,
}

impl std::fmt::Display for SaveBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoLocation => "no location selected",
            Self::EmptyName => "farm name is empty",
            Self::EmptyCoordinates => "latitude or longitude is empty",
        };
        f.write_str(text)
    }
}

/// Identifies one issued lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// A geocoding request the picker wants performed.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Reverse { ticket: Ticket, at: Coordinates },
    Search { ticket: Ticket, query: String },
}

/// Monotonic ticket source. Advancing without issuing invalidates whatever
/// is in flight.
#[derive(Debug, Default)]
struct RequestSeq {
    next: u64,
    current: Option<u64>,
}

impl RequestSeq {
    fn issue(&mut self) -> Ticket {
        self.next += 1;
        self.current = Some(self.next);
        Ticket(self.next)
    }

    fn invalidate(&mut self) {
        self.current = None;
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.current == Some(ticket.0)
    }

    fn retire(&mut self, ticket: Ticket) {
        if self.is_current(ticket) {
            self.current = None;
        }
    }
}

pub struct LocationPicker {
    options: PickerOptions,
    geocoder: Option<Arc<dyn Geocoder>>,
    open: bool,
    last_outcome: Option<Outcome>,
    fields: PickerFields,
    held: Option<SelectedLocation>,
    coordinate_token: SuppressToken,
    search_token: SuppressToken,
    coordinate_timer: Debounce,
    search_timer: Debounce,
    seq: RequestSeq,
    lookups: u64,
}

impl LocationPicker {
    /// A closed picker without a geocoder: points are labelled by their
    /// coordinates and search fields are inert.
    #[must_use]
    pub fn new(options: PickerOptions) -> Self {
        Self {
            coordinate_timer: Debounce::new(options.debounce),
            search_timer: Debounce::new(options.debounce),
            options,
            geocoder: None,
            open: false,
            last_outcome: None,
            fields: PickerFields::default(),
            held: None,
            coordinate_token: SuppressToken::default(),
            search_token: SuppressToken::default(),
            seq: RequestSeq::default(),
            lookups: 0,
        }
    }

    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Starts a fresh session. Nothing from a previous session survives.
    pub fn open(&mut self) {
        self.discard();
        self.open = true;
        self.last_outcome = None;
        tracing::debug!("location picker opened");
    }

    /// Ends the session without saving.
    pub fn cancel(&mut self) {
        if !self.open {
            return;
        }
        self.discard();
        self.last_outcome = Some(Outcome::Cancelled);
        tracing::debug!("location picker cancelled");
    }

    fn discard(&mut self) {
        self.open = false;
        self.fields = PickerFields::default();
        self.held = None;
        self.coordinate_token.reset();
        self.search_token.reset();
        self.coordinate_timer.cancel();
        self.search_timer.cancel();
        self.seq.invalidate();
    }

    #[must_use]
    pub fn state(&self) -> DialogState {
        if self.open {
            DialogState::Open {
                populated: self.held.is_some(),
            }
        } else {
            DialogState::Closed
        }
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    #[must_use]
    pub fn fields(&self) -> &PickerFields {
        &self.fields
    }

    #[must_use]
    pub fn selected(&self) -> Option<&SelectedLocation> {
        self.held.as_ref()
    }

    /// Points for the map surface: at most one.
    #[must_use]
    pub fn markers(&self) -> Vec<Coordinates> {
        self.held.iter().map(|held| held.coordinates).collect()
    }

    /// Lookups issued since construction.
    #[must_use]
    pub fn lookup_count(&self) -> u64 {
        self.lookups
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Selects the clicked point, replacing any previous selection.
    ///
    /// Returns a reverse lookup when reverse geocoding is available. Until it
    /// completes, or if it fails, the point is labelled by its coordinates.
    pub fn map_click(&mut self, latitude: f64, longitude: f64) -> Option<Lookup> {
        if !self.open {
            tracing::debug!("map click ignored, picker closed");
            return None;
        }
        let at = Coordinates::new(latitude, longitude);
        if !at.is_valid() {
            tracing::warn!(latitude, longitude, "map click outside valid range ignored");
            return None;
        }
        self.seq.invalidate();
        self.commit_point(at);
        self.reverse_enabled().then(|| self.issue_reverse(at))
    }

    pub fn set_farm_name(&mut self, text: impl Into<String>) {
        if self.open {
            self.fields.farm_name = text.into();
        }
    }

    pub fn set_latitude_text(&mut self, text: impl Into<String>) {
        if self.open {
            self.fields.latitude = text.into();
            self.observe(Channel::Coordinates);
        }
    }

    pub fn set_longitude_text(&mut self, text: impl Into<String>) {
        if self.open {
            self.fields.longitude = text.into();
            self.observe(Channel::Coordinates);
        }
    }

    pub fn set_country_text(&mut self, text: impl Into<String>) {
        if self.open {
            self.fields.country = text.into();
            self.observe(Channel::Search);
        }
    }

    pub fn set_region_text(&mut self, text: impl Into<String>) {
        if self.open {
            self.fields.region = text.into();
            self.observe(Channel::Search);
        }
    }

    /// Reacts to a change on `channel`: a write the picker made itself
    /// consumes the channel's token and cancels its timer, anything else
    /// restarts the debounce window.
    fn observe(&mut self, channel: Channel) {
        let (token, timer) = match channel {
            Channel::Coordinates => (&mut self.coordinate_token, &mut self.coordinate_timer),
            Channel::Search => (&mut self.search_token, &mut self.search_timer),
        };
        if token.consume() {
            timer.cancel();
            tracing::trace!(?channel, "programmatic write, reaction suppressed");
        } else {
            timer.restart();
        }
    }

    /// Holds a point the user chose directly. A search still waiting on its
    /// debounce window would override it, so that window is dropped.
    fn commit_point(&mut self, at: Coordinates) {
        self.search_timer.cancel();
        self.held = Some(SelectedLocation::from_coordinates(at));
        self.write_coordinates(at);
    }

    fn write_coordinates(&mut self, at: Coordinates) {
        self.coordinate_token.arm();
        self.fields.latitude = format!("{:.6}", at.latitude);
        self.fields.longitude = format!("{:.6}", at.longitude);
        self.observe(Channel::Coordinates);
    }

    fn write_search(&mut self, country: &str, region: &str) {
        self.search_token.arm();
        country.clone_into(&mut self.fields.country);
        region.clone_into(&mut self.fields.region);
        self.observe(Channel::Search);
    }

    // -----------------------------------------------------------------------
    // Debounce
    // -----------------------------------------------------------------------

    /// The earliest pending debounce deadline, for callers running their own
    /// event loop.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.coordinate_timer.deadline(), self.search_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fires every channel whose window has expired.
    pub fn run_pending(&mut self) -> Vec<Lookup> {
        let now = Instant::now();
        let mut lookups = Vec::new();
        for channel in [Channel::Coordinates, Channel::Search] {
            let due = match channel {
                Channel::Coordinates => self.coordinate_timer.fire(now),
                Channel::Search => self.search_timer.fire(now),
            };
            if due {
                lookups.extend(self.fire(channel));
            }
        }
        lookups
    }

    /// Waits for the next deadline and fires it. Returns immediately with no
    /// lookups when nothing is pending.
    pub async fn next_event(&mut self) -> Vec<Lookup> {
        match self.next_deadline() {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.run_pending()
            }
            None => Vec::new(),
        }
    }

    fn fire(&mut self, channel: Channel) -> Option<Lookup> {
        let inputs = PickerInputs {
            fields: &self.fields,
            held: self.held.as_ref(),
            reverse_geocode: self.reverse_enabled(),
            forward_search: self.search_enabled(),
        };
        let decision = reconcile(channel, &inputs);
        tracing::debug!(?channel, ?decision, "debounce window expired");
        match decision {
            Reconciliation::Ignore => None,
            Reconciliation::Derive(at) => {
                self.seq.invalidate();
                self.commit_point(at);
                None
            }
            Reconciliation::Resolve(at) => {
                self.commit_point(at);
                Some(self.issue_reverse(at))
            }
            Reconciliation::Search(query) => {
                let ticket = self.issue();
                Some(Lookup::Search { ticket, query })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    fn reverse_enabled(&self) -> bool {
        self.geocoder.is_some() && self.options.reverse_geocode
    }

    fn search_enabled(&self) -> bool {
        self.geocoder.is_some() && self.options.forward_search
    }

    fn issue(&mut self) -> Ticket {
        self.lookups += 1;
        self.seq.issue()
    }

    fn issue_reverse(&mut self, at: Coordinates) -> Lookup {
        let ticket = self.issue();
        Lookup::Reverse { ticket, at }
    }

    /// Applies a reverse lookup result. Returns `false` if the ticket was
    /// superseded and the result dropped.
    ///
    /// Failure never clears the point: it is kept with a coordinate label and
    /// an unknown country and region.
    pub fn complete_reverse(
        &mut self,
        ticket: Ticket,
        at: Coordinates,
        result: Result<Place, GeocodeError>,
    ) -> bool {
        if !self.open || !self.seq.is_current(ticket) {
            tracing::debug!(?ticket, "stale reverse lookup dropped");
            return false;
        }
        self.seq.retire(ticket);
        match result {
            Ok(place) => {
                let selection = place.into_selection(at);
                if self.options.forward_search {
                    let country = selection.country.clone().unwrap_or_default();
                    let region = selection.region.clone().unwrap_or_default();
                    self.write_search(&country, &region);
                }
                self.held = Some(selection);
            }
            Err(err) => {
                tracing::warn!(%at, error = %err, "reverse geocode failed, using coordinate label");
                self.held = Some(SelectedLocation::fallback(at));
            }
        }
        true
    }

    /// Applies a forward lookup result. Returns `false` if dropped as stale.
    ///
    /// The first place wins. No match clears the held location; a failed
    /// request leaves it as it was.
    pub fn complete_search(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Place>, GeocodeError>,
    ) -> bool {
        if !self.open || !self.seq.is_current(ticket) {
            tracing::debug!(?ticket, "stale search lookup dropped");
            return false;
        }
        self.seq.retire(ticket);
        match result {
            Ok(places) => match places.into_iter().next() {
                Some(place) => {
                    let at = place.coordinates();
                    self.held = Some(place.into_selection(at));
                    self.write_coordinates(at);
                }
                None => {
                    tracing::info!("search matched nothing, clearing selection");
                    self.held = None;
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "forward geocode failed, keeping selection");
            }
        }
        true
    }

    /// Runs `lookup` against the attached geocoder and applies the result.
    pub async fn perform(&mut self, lookup: Lookup) -> bool {
        let Some(geocoder) = self.geocoder.clone() else {
            return false;
        };
        match lookup {
            Lookup::Reverse { ticket, at } => {
                let result = geocoder.reverse(at).await;
                self.complete_reverse(ticket, at, result)
            }
            Lookup::Search { ticket, query } => {
                let result = geocoder.search(&query).await;
                self.complete_search(ticket, result)
            }
        }
    }

    /// Drives debounce windows and lookups until nothing is pending.
    pub async fn settle(&mut self) {
        loop {
            for lookup in self.next_event().await {
                self.perform(lookup).await;
            }
            if self.next_deadline().is_none() {
                break;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn save_blockers(&self) -> Vec<SaveBlocker> {
        let mut blockers = Vec::new();
        if self.held.is_none() {
            blockers.push(SaveBlocker::NoLocation);
        }
        if self.fields.farm_name.trim().is_empty() {
            blockers.push(SaveBlocker::EmptyName);
        }
        if self.fields.latitude.trim().is_empty() || self.fields.longitude.trim().is_empty() {
            blockers.push(SaveBlocker::EmptyCoordinates);
        }
        blockers
    }

    #[must_use]
    pub fn can_save(&self) -> bool {
        self.open && self.save_blockers().is_empty()
    }

    /// Hands the held location to `sink` and closes the picker.
    ///
    /// # Errors
    ///
    /// - [`PickerError::NotOpen`] outside a session.
    /// - [`PickerError::NotReady`] while any [`SaveBlocker`] applies.
    /// - [`PickerError::Invalid`] if the form fails validation.
    /// - [`PickerError::Persist`] if the sink fails; the session stays open
    ///   with everything intact.
    pub async fn save(&mut self, sink: &dyn LocationSink) -> Result<LocationDraft, PickerError> {
        if !self.open {
            return Err(PickerError::NotOpen);
        }
        let blockers = self.save_blockers();
        if !blockers.is_empty() {
            return Err(PickerError::NotReady(blockers));
        }
        validate::location_form(
            &self.fields.farm_name,
            &self.fields.latitude,
            &self.fields.longitude,
        )
        .map_err(PickerError::Invalid)?;

        let Some(held) = self.held.as_ref() else {
            return Err(PickerError::NotReady(vec![SaveBlocker::NoLocation]));
        };
        let draft = build_draft(&self.fields.farm_name, held);

        if let Err(source) = sink.persist(&draft).await {
            tracing::warn!(error = %source, "saving location failed, keeping picker open");
            return Err(PickerError::Persist { source });
        }

        tracing::info!(
            display_name = %draft.display_name,
            coordinates = %draft.coordinates,
            "location saved"
        );
        self.discard();
        self.last_outcome = Some(Outcome::Saved);
        Ok(draft)
    }
}

/// Name precedence: what the user typed, then the held label. Every held
/// selection carries a label, at worst its coordinate pair.
fn build_draft(farm_name: &str, held: &SelectedLocation) -> LocationDraft {
    let typed = farm_name.trim();
    let display_name = if typed.is_empty() {
        held.display_name.clone()
    } else {
        typed.to_owned()
    };
    LocationDraft {
        display_name,
        coordinates: held.coordinates,
        country: held.country.clone(),
        region: held.region.clone(),
    }
}

#[cfg(test)]
#[path = "picker_test.rs"]
mod tests;
